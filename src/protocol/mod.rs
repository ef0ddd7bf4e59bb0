//! Wire protocol between the two replicas
//!
//! Exactly two message types cross the channel:
//!
//! - `Edit`: a locally-originated operation, in the sender's coordinates at
//!   the time it was made
//! - `Ack`: confirmation that the peer applied the edit with that sequence
//!
//! Layout, format and composition traffic belongs to the embedding layer and
//! never goes through this protocol.

pub mod serialize;

use crate::operation::{Operation, Origin};
use crate::range::TextRange;
use serde::{Deserialize, Serialize};

/// A message on the replica channel
///
/// JSON form is internally tagged:
///
/// ```rust
/// use textsync_core::WireMessage;
///
/// let ack: WireMessage = serde_json::from_str(r#"{"type":"ack","sequence":3}"#).unwrap();
/// assert_eq!(ack, WireMessage::Ack { sequence: 3 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireMessage {
    Edit {
        sequence: u64,
        range_start: usize,
        range_end: usize,
        inserted_text: String,
    },
    Ack {
        sequence: u64,
    },
}

impl WireMessage {
    /// Edit message carrying a local operation
    pub fn edit(op: &Operation) -> Self {
        WireMessage::Edit {
            sequence: op.sequence(),
            range_start: op.start(),
            range_end: op.end(),
            inserted_text: op.text().to_string(),
        }
    }

    pub fn ack(sequence: u64) -> Self {
        WireMessage::Ack { sequence }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            WireMessage::Edit { sequence, .. } | WireMessage::Ack { sequence } => *sequence,
        }
    }

    /// The operation an `Edit` describes, as seen by the receiver
    pub fn to_remote_operation(&self) -> Option<Operation> {
        match self {
            WireMessage::Edit {
                sequence,
                range_start,
                range_end,
                inserted_text,
            } => Some(Operation::new(
                TextRange::new(*range_start, *range_end),
                inserted_text.clone(),
                Origin::Remote,
                *sequence,
            )),
            WireMessage::Ack { .. } => None,
        }
    }
}
