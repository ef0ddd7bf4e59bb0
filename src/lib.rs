//! TextSync Core - Dual-replica text synchronization
//!
//! Two replicas of one text buffer are edited concurrently (typically an
//! input-handling side and an application-logic side) and kept convergent
//! over an ordered channel. It implements:
//! - Optimistic local edits with a queue of unacknowledged operations
//! - Offset transformation of concurrent edits, with a configurable policy
//!   for overlapping ranges
//! - Selection tracking across remote edits
//! - JSON and (optionally) Protocol Buffers wire codecs
//! - Snapshot resync after a protocol failure
//!
//! # Examples
//!
//! ```rust
//! use textsync_core::{Replica, ReplicaConfig, ReplicaEvent};
//!
//! let mut input = Replica::with_text("input".to_string(), ReplicaConfig::primary(), "abc");
//! let mut logic = Replica::with_text("logic".to_string(), ReplicaConfig::secondary(), "abc");
//!
//! logic.submit_local_edit(0, 0, "x").unwrap();
//! for msg in logic.drain_outgoing() {
//!     input.receive(msg).unwrap();
//! }
//!
//! assert_eq!(input.text(), "xabc");
//! assert!(matches!(input.drain_events()[0], ReplicaEvent::BufferChanged { .. }));
//! ```

pub mod buffer;
pub mod channel;
pub mod config;
pub mod error;
pub mod operation;
pub mod protocol;
pub mod range;
pub mod replica;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use buffer::TextBuffer;
pub use channel::{Channel, Codec, MemoryChannel};
pub use config::{ReplicaConfig, Site, DEFAULT_ACK_TIMEOUT};
pub use error::{ProtocolViolation, Result, SyncError};
pub use operation::{
    map_offset, transform, transform_pair, Bias, Operation, Origin, OverlapPolicy, Rebased,
};
pub use protocol::WireMessage;
pub use range::{Selection, TextRange};
pub use replica::{
    DegradedReason, PendingEntry, PendingQueue, QueueRebase, Replica, ReplicaEvent, Snapshot,
};
pub use session::Session;

/// Replica identifier type, used in log fields
pub type ReplicaID = String;
