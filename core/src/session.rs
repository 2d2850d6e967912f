//! Keyboard session: key events in, document edits out.
//!
//! `KeyboardSession` is what the platform integration talks to. It owns the
//! session's single [`AbbreviationTracker`] and its [`ExpansionConfig`], turns
//! each key event into an [`EditAction`], and leaves applying that action to
//! the host's document. The host reports cursor moves it did not cause with
//! [`KeyEvent::CursorMoved`].

use crate::config::ExpansionConfig;
use crate::error::StoreError;
use crate::expander::ExpansionResult;
use crate::store::{AbbreviationLookup, AbbreviationStore};
use crate::tracker::AbbreviationTracker;

/// Key events the session understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// A character key. `' '` and `'\n'` behave like `Space` and `Enter`.
    Char(char),
    /// A key that commits several characters at once.
    Text(String),
    Space,
    Enter,
    Backspace,
    /// The cursor moved for any reason other than typing (tap, selection,
    /// arrow keys, another app editing the field).
    CursorMoved,
}

/// What the host should do to its document after a key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Nothing to edit.
    None,
    /// Insert text at the cursor.
    Commit(String),
    /// Delete this many characters before the cursor.
    DeleteBefore(usize),
    /// Replace the typed trigger with its expansion.
    ///
    /// Delete `delete_before` characters, insert `text`, then either put the
    /// cursor `cursor_offset` characters into `text` or, without an offset,
    /// insert `separator` after it.
    Expand {
        delete_before: usize,
        text: String,
        cursor_offset: Option<usize>,
        separator: char,
    },
}

impl EditAction {
    fn from_expansion(result: ExpansionResult, separator: char) -> Self {
        EditAction::Expand {
            delete_before: result.abbreviation_length,
            text: result.expanded_text,
            cursor_offset: result.cursor_offset,
            separator,
        }
    }

    /// Apply the action to a plain-text document.
    ///
    /// `cursor` is a character index into `text` and is updated in place.
    pub fn apply(&self, text: &mut String, cursor: &mut usize) {
        *cursor = (*cursor).min(text.chars().count());
        match self {
            EditAction::None => {}
            EditAction::Commit(s) => {
                text.insert_str(byte_index(text, *cursor), s);
                *cursor += s.chars().count();
            }
            EditAction::DeleteBefore(n) => {
                delete_before(text, cursor, *n);
            }
            EditAction::Expand {
                delete_before: n,
                text: expansion,
                cursor_offset,
                separator,
            } => {
                delete_before(text, cursor, *n);
                let start = *cursor;
                text.insert_str(byte_index(text, start), expansion);
                let end = start + expansion.chars().count();
                match cursor_offset {
                    Some(offset) => *cursor = start + offset,
                    None => {
                        text.insert(byte_index(text, end), *separator);
                        *cursor = end + 1;
                    }
                }
            }
        }
    }
}

fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn delete_before(text: &mut String, cursor: &mut usize, n: usize) {
    let n = n.min(*cursor);
    let from = byte_index(text, *cursor - n);
    let to = byte_index(text, *cursor);
    text.replace_range(from..to, "");
    *cursor -= n;
}

/// One active keyboard session.
#[derive(Debug)]
pub struct KeyboardSession<L: AbbreviationLookup> {
    tracker: AbbreviationTracker<L>,
    config: ExpansionConfig,
}

impl KeyboardSession<AbbreviationStore> {
    /// Open a session on the store named by `config.store_path`, or on an
    /// empty in-memory store when no path is configured.
    pub fn from_config(config: ExpansionConfig) -> Result<Self, StoreError> {
        let store = match &config.store_path {
            Some(path) => AbbreviationStore::new_redb(path)?,
            None => AbbreviationStore::new_in_memory(),
        };
        Ok(Self::new(store, config))
    }
}

impl<L: AbbreviationLookup> KeyboardSession<L> {
    pub fn new(lookup: L, config: ExpansionConfig) -> Self {
        Self {
            tracker: AbbreviationTracker::new(lookup),
            config,
        }
    }

    /// The session's tracker, for callers that drive it directly.
    pub fn tracker(&self) -> &AbbreviationTracker<L> {
        &self.tracker
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ExpansionConfig) {
        self.config = config;
    }

    /// Process a key event.
    ///
    /// `text_before_cursor` is only consulted when buffer tracking is off;
    /// the host passes what its editor reports before the cursor. Store
    /// failures propagate and leave the session state unchanged.
    pub fn process_key(
        &self,
        key: KeyEvent,
        text_before_cursor: Option<&str>,
    ) -> Result<EditAction, StoreError> {
        let action = match key {
            KeyEvent::Space => self.on_separator(' ', text_before_cursor)?,
            KeyEvent::Enter => self.on_separator('\n', text_before_cursor)?,
            KeyEvent::Char(ch @ (' ' | '\n')) => self.on_separator(ch, text_before_cursor)?,
            KeyEvent::Char(ch) => {
                self.tracker.on_character_typed(ch);
                EditAction::Commit(ch.to_string())
            }
            KeyEvent::Text(text) => {
                self.tracker.on_text_typed(&text);
                EditAction::Commit(text)
            }
            KeyEvent::Backspace => {
                self.tracker.on_backspace();
                EditAction::DeleteBefore(1)
            }
            KeyEvent::CursorMoved => {
                self.tracker.clear_buffer();
                EditAction::None
            }
        };
        Ok(action)
    }

    fn on_separator(
        &self,
        separator: char,
        text_before_cursor: Option<&str>,
    ) -> Result<EditAction, StoreError> {
        if !self.config.triggers_on(separator) {
            self.tracker.on_character_typed(separator);
            return Ok(EditAction::Commit(separator.to_string()));
        }

        let result = if self.config.track_typed_buffer {
            self.tracker.check_at_separator(separator)?
        } else {
            self.tracker
                .check_text_at_separator(text_before_cursor.unwrap_or(""), separator)?
        };

        if result.should_expand {
            Ok(EditAction::from_expansion(result, separator))
        } else {
            Ok(EditAction::Commit(separator.to_string()))
        }
    }
}
