//! TextBuffer: character sequence with range replace as its only mutation
//!
//! Backed by a [`ropey::Rope`], so replacing a range is O(log n) and cloning a
//! buffer (a snapshot) is cheap: rope nodes are shared until written.

use crate::error::Result;
use crate::range::TextRange;
use ropey::Rope;

/// Indexable sequence of Unicode scalar values
///
/// # Example
///
/// ```rust
/// use textsync_core::TextBuffer;
///
/// let mut buffer = TextBuffer::from("abc");
/// buffer.apply(3, 3, "d").unwrap();
/// buffer.apply(0, 1, "x").unwrap();
///
/// assert_eq!(buffer.to_string(), "xbcd");
/// assert_eq!(buffer.len(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Replace characters in `[start, end)` with `text`
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Range` if `start > end` or `end > len()`. The buffer
    /// is left untouched in that case.
    pub fn apply(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        TextRange::new(start, end).validate(self.len())?;

        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        Ok(())
    }

    /// Copy out the characters in `[start, end)`
    pub fn slice(&self, start: usize, end: usize) -> Result<String> {
        TextRange::new(start, end).validate(self.len())?;
        Ok(self.rope.slice(start..end).to_string())
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl PartialEq for TextBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.rope == other.rope
    }
}

impl Eq for TextBuffer {}

impl PartialEq<&str> for TextBuffer {
    fn eq(&self, other: &&str) -> bool {
        self.rope == *other
    }
}
