//! Buffer of characters typed through the keyboard.
//!
//! The typed buffer records the characters the user entered contiguously via
//! this keyboard (e.g. "hello brb"). It is what separates freshly typed text
//! from text that already existed in the document: the host clears it as soon
//! as the cursor moves by any means other than typing.

/// Append-only-until-reset record of typed characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedBuffer {
    text: String,
}

impl TypedBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Borrow the buffered text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> String {
        self.text.clone()
    }

    /// Number of characters (not bytes) in the buffer.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append one character at the end.
    pub fn append(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Append every character of `s`, in order.
    pub fn append_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Remove the final character (backspace).
    /// Returns the removed character, or `None` when the buffer was empty.
    pub fn remove_last(&mut self) -> Option<char> {
        self.text.pop()
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl std::fmt::Display for TypedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
