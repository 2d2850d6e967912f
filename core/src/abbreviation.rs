//! Stored abbreviation records.

use crate::error::StoreError;
use crate::expander::WORD_SEPARATORS;
use serde::{Deserialize, Serialize};

/// Reserved marker inside an expansion that sets the cursor position.
pub const CURSOR_PLACEHOLDER: &str = "$0";

/// A single trigger -> expansion mapping.
///
/// `abbreviation` is always stored lower-cased; it is the unique key of the
/// store. `id` is assigned by the store and stays stable across edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abbreviation {
    pub id: u64,
    pub abbreviation: String,
    pub expansion: String,
}

impl Abbreviation {
    pub fn new<A: Into<String>, E: Into<String>>(id: u64, abbreviation: A, expansion: E) -> Self {
        Self {
            id,
            abbreviation: abbreviation.into(),
            expansion: expansion.into(),
        }
    }

    /// Whether the expansion carries a cursor placeholder.
    pub fn has_cursor_placeholder(&self) -> bool {
        self.expansion.contains(CURSOR_PLACEHOLDER)
    }
}

/// Canonical lookup key for a trigger: trimmed and lower-cased.
pub fn normalize_trigger(trigger: &str) -> String {
    trigger.trim().to_lowercase()
}

/// Validate user input for an abbreviation and return the normalized trigger.
///
/// Both sides must contain something other than whitespace. A trigger may not
/// contain a separator, since the resolver only ever sees a single word.
pub fn validate(abbreviation: &str, expansion: &str) -> Result<String, StoreError> {
    if abbreviation.trim().is_empty() {
        return Err(StoreError::Invalid("abbreviation is blank".to_string()));
    }
    if expansion.trim().is_empty() {
        return Err(StoreError::Invalid("expansion is blank".to_string()));
    }
    let trigger = normalize_trigger(abbreviation);
    if trigger.contains(&WORD_SEPARATORS[..]) {
        return Err(StoreError::Invalid(format!(
            "abbreviation '{}' contains a separator",
            trigger
        )));
    }
    Ok(trigger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_trigger("  BRB "), "brb");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(matches!(validate("  ", "x"), Err(StoreError::Invalid(_))));
        assert!(matches!(validate("x", "\n"), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_inner_separator() {
        assert!(validate("b rb", "be right back").is_err());
        assert_eq!(validate("Sig", "Best,\n$0").unwrap(), "sig");
    }

    #[test]
    fn placeholder_detection() {
        assert!(Abbreviation::new(1, "sig", "Best,\n$0").has_cursor_placeholder());
        assert!(!Abbreviation::new(2, "brb", "be right back").has_cursor_placeholder());
    }
}
