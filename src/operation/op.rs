//! Operation: one immutable range-replace mutation

use crate::range::TextRange;
use serde::{Deserialize, Serialize};

/// Which side of the channel an operation was created on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Local => write!(f, "local"),
            Origin::Remote => write!(f, "remote"),
        }
    }
}

/// Replace `range` with `text`
///
/// Operations are values: rebasing one produces a new operation with the
/// same origin and sequence. The sequence is assigned by the replica that
/// created the operation and only identifies it for ACK matching.
///
/// # Example
///
/// ```rust
/// use textsync_core::{Operation, Origin, TextRange};
///
/// let op = Operation::new(TextRange::point(3), "d", Origin::Local, 1);
/// assert!(op.is_insert());
/// assert_eq!(op.text_len(), 1);
/// assert_eq!(op.delta(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    range: TextRange,
    text: String,
    origin: Origin,
    sequence: u64,

    /// Inserted length in characters
    text_len: usize,
}

impl Operation {
    pub fn new(range: TextRange, text: impl Into<String>, origin: Origin, sequence: u64) -> Self {
        let text = text.into();
        Self {
            range,
            text_len: text.chars().count(),
            text,
            origin,
            sequence,
        }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Pure insertion (nothing removed)
    pub fn is_insert(&self) -> bool {
        self.range.is_empty()
    }

    /// Change in buffer length caused by this operation
    pub fn delta(&self) -> isize {
        self.text_len as isize - self.range.len() as isize
    }

    /// Same bookkeeping, new range and text
    pub(crate) fn rebased(&self, range: TextRange, text: String) -> Self {
        Self::new(range, text, self.origin, self.sequence)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#{} [{}) -> {:?}",
            self.origin, self.sequence, self.range, self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_accessors() {
        let op = Operation::new(TextRange::new(1, 4), "xy", Origin::Remote, 7);

        assert_eq!(op.start(), 1);
        assert_eq!(op.end(), 4);
        assert_eq!(op.text(), "xy");
        assert_eq!(op.origin(), Origin::Remote);
        assert_eq!(op.sequence(), 7);
        assert!(!op.is_insert());
        assert_eq!(op.delta(), -1);
    }

    #[test]
    fn test_text_len_counts_chars() {
        let op = Operation::new(TextRange::point(0), "👋é", Origin::Local, 1);
        assert_eq!(op.text_len(), 2);
    }

    #[test]
    fn test_rebased_keeps_identity() {
        let op = Operation::new(TextRange::point(3), "d", Origin::Local, 1);
        let moved = op.rebased(TextRange::point(4), "d".to_string());

        assert_eq!(moved.sequence(), 1);
        assert_eq!(moved.origin(), Origin::Local);
        assert_eq!(moved.range(), TextRange::point(4));
    }

    #[test]
    fn test_display() {
        let op = Operation::new(TextRange::point(3), "d", Origin::Local, 1);
        assert_eq!(op.to_string(), "local#1 [3..3) -> \"d\"");
    }
}
