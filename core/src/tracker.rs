//! Abbreviation tracker: the typed buffer plus expansion checks.
//!
//! One tracker belongs to one keyboard session. It may be shared by reference
//! across threads; every operation takes the same mutex for its full duration,
//! so buffer edits and checks are observed in a single total order and a
//! check never sees the buffer change halfway through its lookup.

use crate::error::StoreError;
use crate::expander::{resolve, ExpansionResult};
use crate::store::AbbreviationLookup;
use crate::typed_buffer::TypedBuffer;
use parking_lot::Mutex;

/// Typed-buffer tracking and abbreviation checks over a lookup `L`.
#[derive(Debug)]
pub struct AbbreviationTracker<L: AbbreviationLookup> {
    buffer: Mutex<TypedBuffer>,
    lookup: L,
}

impl<L: AbbreviationLookup> AbbreviationTracker<L> {
    /// Create a tracker with an empty buffer.
    pub fn new(lookup: L) -> Self {
        tracing::debug!("creating abbreviation tracker");
        Self {
            buffer: Mutex::new(TypedBuffer::new()),
            lookup,
        }
    }

    /// The lookup this tracker resolves against.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Record a character typed through the keyboard.
    pub fn on_character_typed(&self, ch: char) {
        let mut buffer = self.buffer.lock();
        buffer.append(ch);
        tracing::debug!(%ch, buffer = %buffer.text(), "character typed");
    }

    /// Record a multi-character key press (e.g. a key that commits a string).
    pub fn on_text_typed(&self, text: &str) {
        let mut buffer = self.buffer.lock();
        buffer.append_str(text);
        tracing::debug!(text, buffer = %buffer.text(), "text typed");
    }

    /// Record a backspace; no-op on an empty buffer.
    pub fn on_backspace(&self) {
        let mut buffer = self.buffer.lock();
        if buffer.remove_last().is_some() {
            tracing::debug!(buffer = %buffer.text(), "backspace");
        }
    }

    /// Forget everything typed so far. Called when the cursor moves externally.
    pub fn clear_buffer(&self) {
        self.buffer.lock().clear();
        tracing::debug!("buffer cleared");
    }

    /// Current buffer contents.
    pub fn buffer(&self) -> String {
        self.buffer.lock().snapshot()
    }

    /// Check whether the last word in the typed buffer is an abbreviation.
    pub fn check_and_expand(&self) -> Result<ExpansionResult, StoreError> {
        let buffer = self.buffer.lock();
        tracing::debug!(buffer = %buffer.text(), "check_and_expand");
        self.resolve_logged(buffer.text())
    }

    /// Check whether the last word of `text` is an abbreviation.
    ///
    /// Used when the host supplies the text before the cursor instead of
    /// relying on the typed buffer. Serialized with the buffer operations.
    pub fn check_and_expand_text(&self, text: &str) -> Result<ExpansionResult, StoreError> {
        let _guard = self.buffer.lock();
        tracing::debug!(text, "check_and_expand_text");
        self.resolve_logged(text)
    }

    /// Check the typed buffer for a separator key, then record the separator.
    ///
    /// After an expansion the buffer no longer mirrors the document, so it is
    /// restarted: it holds just the separator when the cursor ends up after
    /// the expansion, and nothing when a placeholder moved the cursor into
    /// it. On a lookup failure the buffer is left untouched.
    pub fn check_at_separator(&self, separator: char) -> Result<ExpansionResult, StoreError> {
        let mut buffer = self.buffer.lock();
        tracing::debug!(buffer = %buffer.text(), ?separator, "check_at_separator");
        let result = self.resolve_logged(buffer.text())?;
        restart_after_separator(&mut buffer, &result, separator);
        Ok(result)
    }

    /// Like [`check_at_separator`](Self::check_at_separator), but checks the
    /// host-supplied `text` instead of the typed buffer.
    ///
    /// The buffer is still updated, under the same lock as the lookup, so a
    /// keystroke from another thread lands either before or after the whole
    /// separator.
    pub fn check_text_at_separator(
        &self,
        text: &str,
        separator: char,
    ) -> Result<ExpansionResult, StoreError> {
        let mut buffer = self.buffer.lock();
        tracing::debug!(text, ?separator, "check_text_at_separator");
        let result = self.resolve_logged(text)?;
        restart_after_separator(&mut buffer, &result, separator);
        Ok(result)
    }

    fn resolve_logged(&self, text: &str) -> Result<ExpansionResult, StoreError> {
        resolve(text, &self.lookup).inspect_err(|e| {
            tracing::warn!(error = %e, "abbreviation lookup failed");
        })
    }
}

fn restart_after_separator(buffer: &mut TypedBuffer, result: &ExpansionResult, separator: char) {
    if result.should_expand {
        buffer.clear();
    }
    if result.cursor_offset.is_none() {
        buffer.append(separator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAbbreviationStore;
    use std::sync::Arc;

    fn tracker() -> AbbreviationTracker<InMemoryAbbreviationStore> {
        let store = InMemoryAbbreviationStore::new();
        store.insert_or_update("brb", "be right back", None).unwrap();
        store.insert_or_update("sig", "Best,\n$0", None).unwrap();
        AbbreviationTracker::new(store)
    }

    fn type_str(t: &AbbreviationTracker<InMemoryAbbreviationStore>, s: &str) {
        for ch in s.chars() {
            t.on_character_typed(ch);
        }
    }

    #[test]
    fn typed_trigger_expands() {
        let t = tracker();
        type_str(&t, "hello brb");
        assert_eq!(t.buffer(), "hello brb");
        let r = t.check_and_expand().unwrap();
        assert_eq!(r, ExpansionResult::expand("be right back", None, 3));
    }

    #[test]
    fn backspace_edits_buffer() {
        let t = tracker();
        type_str(&t, "brbx");
        assert!(!t.check_and_expand().unwrap().should_expand);
        t.on_backspace();
        assert!(t.check_and_expand().unwrap().should_expand);
    }

    #[test]
    fn backspace_on_empty_buffer_is_noop() {
        let t = tracker();
        t.on_backspace();
        assert_eq!(t.buffer(), "");
    }

    #[test]
    fn cleared_buffer_never_expands() {
        let t = tracker();
        type_str(&t, "brb");
        t.clear_buffer();
        assert_eq!(t.buffer(), "");
        assert!(!t.check_and_expand().unwrap().should_expand);
    }

    #[test]
    fn text_check_ignores_buffer() {
        let t = tracker();
        type_str(&t, "nothing");
        let r = t.check_and_expand_text("Sig").unwrap();
        assert_eq!(r, ExpansionResult::expand("Best,\n", Some(6), 3));
        assert_eq!(t.buffer(), "nothing");
    }

    #[test]
    fn separator_check_restarts_buffer_after_expansion() {
        let t = tracker();
        type_str(&t, "hello brb");
        let r = t.check_at_separator(' ').unwrap();
        assert!(r.should_expand);
        assert_eq!(t.buffer(), " ");
    }

    #[test]
    fn separator_check_with_placeholder_empties_buffer() {
        let t = tracker();
        type_str(&t, "sig");
        let r = t.check_at_separator('\n').unwrap();
        assert_eq!(r.cursor_offset, Some(6));
        assert_eq!(t.buffer(), "");
    }

    #[test]
    fn separator_check_without_match_appends() {
        let t = tracker();
        type_str(&t, "hello");
        assert!(!t.check_at_separator(' ').unwrap().should_expand);
        assert_eq!(t.buffer(), "hello ");
        assert!(!t.check_at_separator(' ').unwrap().should_expand);
        assert_eq!(t.buffer(), "hello  ");
    }

    #[test]
    fn concurrent_typing_is_linearized() {
        let t = Arc::new(tracker());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let t = Arc::clone(&t);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        t.on_character_typed('a');
                        let _ = t.check_and_expand().unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(t.buffer().chars().count(), 1000);
    }

    #[test]
    fn separator_checks_race_typing_atomically() {
        // One thread types 'x', the other presses space after a trigger.
        // Whichever wins, the buffer holds the separator and the keystroke as
        // a unit: "x" then the restarted " ", or " " then "x".
        for _ in 0..2_000 {
            let t = Arc::new(tracker());
            let typist = {
                let t = Arc::clone(&t);
                std::thread::spawn(move || t.on_character_typed('x'))
            };
            let result = t.check_text_at_separator("brb", ' ').unwrap();
            typist.join().unwrap();
            assert!(result.should_expand);
            let buffer = t.buffer();
            assert!(buffer == " " || buffer == " x", "buffer was {:?}", buffer);
        }
    }

    #[test]
    fn buffer_separator_checks_race_typing() {
        let t = Arc::new(tracker());
        let typists: Vec<_> = (0..3)
            .map(|_| {
                let t = Arc::clone(&t);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        t.on_character_typed('a');
                    }
                })
            })
            .collect();
        let mut separators = 0;
        for _ in 0..200 {
            let result = t.check_at_separator(' ').unwrap();
            assert!(!result.should_expand);
            separators += 1;
        }
        for h in typists {
            h.join().unwrap();
        }
        let buffer = t.buffer();
        assert_eq!(buffer.chars().filter(|&c| c == 'a').count(), 600);
        assert_eq!(buffer.chars().filter(|&c| c == ' ').count(), separators);
    }

    #[test]
    fn text_separator_check_restarts_buffer() {
        let t = tracker();
        type_str(&t, "stale");
        let result = t.check_text_at_separator("ok brb", ' ').unwrap();
        assert_eq!(result.expanded_text, "be right back");
        assert_eq!(t.buffer(), " ");

        let result = t.check_text_at_separator("sig", '\n').unwrap();
        assert_eq!(result.cursor_offset, Some(6));
        assert_eq!(t.buffer(), "");

        assert!(!t.check_text_at_separator("nothing", ' ').unwrap().should_expand);
        assert_eq!(t.buffer(), " ");
    }
}
