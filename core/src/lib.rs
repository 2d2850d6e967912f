//! libabbrev-core
//!
//! Abbreviation expansion for keyboard input methods: a buffer of freshly
//! typed characters, an abbreviation store, and the resolver that turns a
//! typed trigger (e.g. "brb") into its expansion ("be right back").
//!
//! Abbreviations live in redb for persistence, or in memory for tests and
//! throwaway sessions.
//!
//! Public API:
//! - `TypedBuffer` - Characters typed contiguously through the keyboard
//! - `resolve` / `ExpansionResult` - Trailing-word lookup and cursor placeholder handling
//! - `AbbreviationTracker` - Serialized buffer + resolver owned by one session
//! - `KeyboardSession` - Key events to document edits
//! - `AbbreviationStore` - In-memory or redb-backed abbreviation storage
//! - `ExpansionConfig` - Configuration and feature flags
//! - `interchange` - CSV and escape helpers for the import/export tools

pub mod abbreviation;
pub use abbreviation::{normalize_trigger, Abbreviation, CURSOR_PLACEHOLDER};

pub mod error;
pub use error::StoreError;

pub mod typed_buffer;
pub use typed_buffer::TypedBuffer;

pub mod expander;
pub use expander::{resolve, trailing_word, ExpansionResult, WORD_SEPARATORS};

pub mod store;
pub use store::{
    AbbreviationLookup, AbbreviationStore, InMemoryAbbreviationStore, RedbAbbreviationStore,
};

pub mod tracker;
pub use tracker::AbbreviationTracker;

pub mod config;
pub use config::{ConfigError, ExpansionConfig};

pub mod interchange;
pub use interchange::unescape;

pub mod session;
pub use session::{EditAction, KeyEvent, KeyboardSession};
