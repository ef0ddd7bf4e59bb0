//! Half-open character ranges and the selection marker
//!
//! All offsets count Unicode scalar values (`char`s), never bytes.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};

/// Half-open range `[start, end)` of character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-length range at `offset`
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check `start <= end <= length`
    pub fn validate(&self, length: usize) -> Result<()> {
        if self.start > self.end || self.end > length {
            return Err(SyncError::Range {
                start: self.start,
                end: self.end,
                length,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Selection tracked alongside a replica's visible buffer
///
/// `start == end` is a caret. The selection never travels over the wire;
/// each replica adjusts its own copy whenever its visible buffer changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> TextRange {
        TextRange::new(self.start, self.end)
    }

    /// Pull both ends back inside a buffer of `length` characters
    pub fn clamp(&self, length: usize) -> Self {
        Self::new(self.start.min(length), self.end.min(length))
    }
}
