//! Trailing-word abbreviation resolution.
//!
//! Given some text (usually the typed buffer, or the text before the cursor
//! when buffer tracking is off), the resolver takes the last word, looks it up
//! case-insensitively and computes what the host should put in its place.

use crate::abbreviation::CURSOR_PLACEHOLDER;
use crate::error::StoreError;
use crate::store::AbbreviationLookup;

/// Characters that separate words for trailing-word extraction.
pub const WORD_SEPARATORS: [char; 2] = [' ', '\n'];

/// Outcome of an expansion check.
///
/// `cursor_offset` is a character offset into `expanded_text`; `None` means
/// the cursor goes after the whole expansion. `abbreviation_length` is the
/// number of characters of the typed trigger the host must delete before
/// inserting `expanded_text`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpansionResult {
    pub should_expand: bool,
    pub expanded_text: String,
    pub cursor_offset: Option<usize>,
    pub abbreviation_length: usize,
}

impl ExpansionResult {
    /// The "nothing to do" result.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn expand<S: Into<String>>(
        expanded_text: S,
        cursor_offset: Option<usize>,
        abbreviation_length: usize,
    ) -> Self {
        Self {
            should_expand: true,
            expanded_text: expanded_text.into(),
            cursor_offset,
            abbreviation_length,
        }
    }
}

/// Last separator-delimited segment of `text`, if it is non-empty.
pub fn trailing_word(text: &str) -> Option<&str> {
    text.rsplit(&WORD_SEPARATORS[..]).next().filter(|w| !w.is_empty())
}

/// Strip every cursor placeholder from `expansion`.
///
/// Returns the cleaned text and the character offset of the first
/// placeholder as it appeared before removal.
pub fn split_cursor_placeholder(expansion: &str) -> (String, Option<usize>) {
    match expansion.find(CURSOR_PLACEHOLDER) {
        Some(byte_idx) => {
            let offset = expansion[..byte_idx].chars().count();
            (expansion.replace(CURSOR_PLACEHOLDER, ""), Some(offset))
        }
        None => (expansion.to_string(), None),
    }
}

/// Resolve the trailing word of `text` against `lookup`.
///
/// Empty input, a trailing separator and unknown words all yield
/// [`ExpansionResult::none`]. Only lookup failures are errors.
pub fn resolve<L>(text: &str, lookup: &L) -> Result<ExpansionResult, StoreError>
where
    L: AbbreviationLookup + ?Sized,
{
    if text.is_empty() {
        tracing::debug!("resolve: text is empty");
        return Ok(ExpansionResult::none());
    }

    let Some(last_word) = trailing_word(text) else {
        tracing::debug!("resolve: no last word found");
        return Ok(ExpansionResult::none());
    };

    let Some(abbreviation) = lookup.get_abbreviation(&last_word.to_lowercase())? else {
        tracing::debug!(last_word, "resolve: no abbreviation found");
        return Ok(ExpansionResult::none());
    };

    let length = last_word.chars().count();
    let (text, cursor_offset) = split_cursor_placeholder(&abbreviation.expansion);
    tracing::debug!(
        last_word,
        expansion = %abbreviation.expansion,
        ?cursor_offset,
        "resolve: expanding"
    );
    Ok(ExpansionResult::expand(text, cursor_offset, length))
}
