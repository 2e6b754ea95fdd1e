//! Raw input buffer of the live composition.
//!
//! Stores the unconverted keystrokes (e.g. `"haoma;h"`) and a byte cursor.
//! Besides keystroke editing the buffer supports two whole-buffer operations
//! used during selection: dropping the code consumed by a confirmed candidate
//! and replacing the buffer outright.

/// Input buffer tracking raw input and cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputBuffer {
    text: String,
    cursor: usize, // byte offset, always on a char boundary
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position (byte offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Delete the character before the cursor.
    /// Returns true if a character was deleted.
    pub fn delete_before(&mut self) -> bool {
        let Some((prev, _)) = self.text[..self.cursor].char_indices().next_back() else {
            return false;
        };
        self.text.remove(prev);
        self.cursor = prev;
        true
    }

    /// Replace the whole buffer, leaving the cursor at the end.
    pub fn set_text<T: Into<String>>(&mut self, text: T) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Drop the first `end` bytes (code consumed by a confirmed candidate).
    ///
    /// `end` is clamped to the buffer and moved back to a char boundary.
    /// Returns the removed prefix.
    pub fn consume_prefix(&mut self, end: usize) -> String {
        let mut end = end.min(self.text.len());
        while !self.text.is_char_boundary(end) {
            end -= 1;
        }
        let removed: String = self.text.drain(..end).collect();
        self.cursor = self.cursor.saturating_sub(end);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace() {
        let mut buf = InputBuffer::new();
        for ch in "wo;p".chars() {
            buf.insert_char(ch);
        }
        assert_eq!(buf.text(), "wo;p");
        assert_eq!(buf.cursor(), 4);
        assert!(buf.delete_before());
        assert_eq!(buf.text(), "wo;");
        buf.clear();
        assert!(!buf.delete_before());
        assert!(buf.is_empty());
    }

    #[test]
    fn backspace_multibyte() {
        let mut buf = InputBuffer::new();
        buf.insert_str("好a");
        assert!(buf.delete_before());
        assert!(buf.delete_before());
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn consume_prefix_keeps_rest() {
        let mut buf = InputBuffer::new();
        buf.insert_str("haoma;h");
        assert_eq!(buf.consume_prefix(3), "hao");
        assert_eq!(buf.text(), "ma;h");
        assert_eq!(buf.cursor(), 4);
        assert_eq!(buf.consume_prefix(100), "ma;h");
        assert!(buf.is_empty());
    }

    #[test]
    fn set_text_moves_cursor_to_end() {
        let mut buf = InputBuffer::new();
        buf.insert_str("abc");
        buf.set_text("ma;");
        assert_eq!(buf.text(), "ma;");
        assert_eq!(buf.cursor(), 3);
    }
}
