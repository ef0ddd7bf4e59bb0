//! Replica state machine
//!
//! Each side of a session owns one [`Replica`]. Local edits apply
//! immediately and wait in the [`PendingQueue`] for the peer's ACK; remote
//! edits are rebased past the queue before they reach the visible buffer.
//!
//! ```text
//!   submit_local_edit ──► visible ──► pending ──► outbox: Edit
//!   receive(Edit)     ──► committed, rebase pending, visible ──► outbox: Ack
//!   receive(Ack)      ──► pending head ──► committed
//! ```

mod event;
mod pending;
mod snapshot;
mod state;

pub use event::{DegradedReason, ReplicaEvent};
pub use pending::{PendingEntry, PendingQueue, QueueRebase};
pub use snapshot::Snapshot;
pub use state::Replica;
