//! Channel: ordered, reliable link between the two replicas
//!
//! The protocol relies on FIFO, exactly-once delivery in each direction and
//! nothing else. Any transport that provides it can carry a session.

mod memory;

pub use memory::{Codec, MemoryChannel};

use crate::error::Result;
use crate::protocol::WireMessage;

/// One endpoint of the bidirectional link
pub trait Channel {
    /// Queue a message for the peer; never blocks
    fn send(&mut self, msg: &WireMessage) -> Result<()>;

    /// Next message from the peer, or `None` if nothing has arrived yet
    fn try_recv(&mut self) -> Result<Option<WireMessage>>;
}
