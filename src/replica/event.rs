//! Notifications a replica raises for the embedding layer

use crate::operation::Origin;
use crate::range::{Selection, TextRange};
use serde::{Deserialize, Serialize};

/// Why a session is no longer healthy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradedReason {
    /// The pending head has waited longer than the configured ACK timeout
    AckTimeout { sequence: u64, waited_ms: u64 },

    /// The channel reported a failure (disconnect, stall)
    ChannelFailure { detail: String },

    /// The peer broke the protocol; the session needs a resync
    ProtocolViolation { detail: String },
}

/// Outbound notification
///
/// Self-originated edits and selections never raise events; the submitting
/// layer already knows about them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplicaEvent {
    /// The visible buffer changed: `range` (pre-change coordinates) now holds `text`
    BufferChanged {
        range: TextRange,
        text: String,
        caused_by: Origin,
    },

    SelectionChanged { selection: Selection },

    SessionDegraded { reason: DegradedReason },
}
