//! Error types for the replica protocol
//!
//! Errors fall into two groups:
//!
//! - **Recoverable**: a local edit or selection is rejected (`Range`,
//!   `Backpressure`). Nothing changed; the caller resubmits with corrected input.
//! - **Fatal**: the ordering assumptions of the channel were broken
//!   (`Protocol`). The replica refuses further work (`SessionFailed`) until it
//!   is rebuilt from a [`Snapshot`](crate::Snapshot).

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors produced by buffers, replicas, codecs and channels
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A range does not fit the buffer it targets
    #[error("range {start}..{end} out of bounds (length: {length})")]
    Range {
        start: usize,
        end: usize,
        length: usize,
    },

    /// The peer broke the ordering contract of the channel
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// The pending window is full; the edit was not applied
    #[error("pending queue full ({capacity} unacknowledged edits)")]
    Backpressure { capacity: usize },

    /// A fatal error was recorded earlier in this session
    #[error("session failed: {0}")]
    SessionFailed(String),

    /// The channel to the peer is gone
    #[error("channel closed")]
    ChannelClosed,

    /// A wire frame or config document could not be encoded/decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The specific way a peer violated the protocol
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// ACK does not name the head of the pending queue
    #[error("ack {received} does not match pending head {expected:?}")]
    UnexpectedAck {
        expected: Option<u64>,
        received: u64,
    },

    /// Remote edit was duplicated or skipped one
    #[error("remote edit sequence {received}, expected {expected}")]
    UnexpectedSequence { expected: u64, received: u64 },

    /// Remote edit does not fit the committed buffer
    #[error("remote edit {start}..{end} out of bounds (committed length: {length})")]
    RemoteRange {
        start: usize,
        end: usize,
        length: usize,
    },
}

impl SyncError {
    /// Whether this error ends the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Protocol(_) | SyncError::SessionFailed(_))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(format!("JSON error: {}", err))
    }
}
