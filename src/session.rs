//! Session: one replica driven over one channel
//!
//! The session moves queued wire messages onto the channel after every local
//! edit and on every `pump`. Channel errors are reported to the replica as a
//! degraded session and returned to the caller.
//!
//! # Example
//!
//! ```rust
//! use textsync_core::{MemoryChannel, Replica, ReplicaConfig, Session};
//!
//! let (left, right) = MemoryChannel::pair();
//! let mut input = Session::new(
//!     Replica::with_text("input".to_string(), ReplicaConfig::primary(), "abc"),
//!     left,
//! );
//! let mut logic = Session::new(
//!     Replica::with_text("logic".to_string(), ReplicaConfig::secondary(), "abc"),
//!     right,
//! );
//!
//! input.submit_local_edit(3, 3, "d").unwrap();
//! logic.submit_local_edit(0, 0, "x").unwrap();
//!
//! input.pump().unwrap();
//! logic.pump().unwrap();
//! input.pump().unwrap();
//!
//! assert_eq!(input.replica().text(), "xabcd");
//! assert_eq!(logic.replica().text(), "xabcd");
//! ```

use crate::channel::Channel;
use crate::error::{Result, SyncError};
use crate::replica::{Replica, ReplicaEvent, Snapshot};
use tracing::trace;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// A replica bound to its channel
#[derive(Debug)]
pub struct Session<C: Channel> {
    replica: Replica,
    channel: C,
}

impl<C: Channel> Session<C> {
    pub fn new(replica: Replica, channel: C) -> Self {
        Self { replica, channel }
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    pub fn replica_mut(&mut self) -> &mut Replica {
        &mut self.replica
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_parts(self) -> (Replica, C) {
        (self.replica, self.channel)
    }

    /// Apply a local edit and send it
    pub fn submit_local_edit(&mut self, start: usize, end: usize, text: &str) -> Result<u64> {
        let sequence = self.replica.submit_local_edit(start, end, text)?;
        self.flush()?;
        Ok(sequence)
    }

    pub fn submit_local_selection(&mut self, start: usize, end: usize) -> Result<()> {
        self.replica.submit_local_selection(start, end)
    }

    /// Process every message that has arrived, then flush the outbox
    ///
    /// Returns the number of messages processed.
    pub fn pump(&mut self) -> Result<usize> {
        let mut received = 0;
        loop {
            let msg = match self.channel.try_recv() {
                Ok(Some(msg)) => msg,
                Ok(None) => break,
                Err(err) => return Err(self.channel_failed(err)),
            };
            if let Err(err) = self.replica.receive(msg) {
                // ACKs for messages already processed still go out
                self.flush()?;
                return Err(err);
            }
            received += 1;
        }
        self.flush()?;
        if received > 0 {
            trace!(replica = %self.replica.id(), received, "pumped channel");
        }
        Ok(received)
    }

    /// Send everything the replica has queued
    ///
    /// A message leaves the outbox only once the channel accepted it, so a
    /// failed send keeps it and every later message for the next flush.
    pub fn flush(&mut self) -> Result<()> {
        while let Some(msg) = self.replica.peek_outgoing() {
            if let Err(err) = self.channel.send(msg) {
                return Err(self.channel_failed(err));
            }
            self.replica.pop_outgoing();
        }
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn check_stalled(&mut self, now: Instant) -> bool {
        self.replica.check_stalled(now)
    }

    pub fn drain_events(&mut self) -> Vec<ReplicaEvent> {
        self.replica.drain_events()
    }

    /// Restart the replica from `snapshot`
    ///
    /// Messages from the old session still in flight on the channel would be
    /// misread by the new one; callers pair this with a fresh channel.
    pub fn reset(&mut self, snapshot: &Snapshot, channel: C) {
        self.replica.reset(snapshot);
        self.channel = channel;
    }

    fn channel_failed(&mut self, err: SyncError) -> SyncError {
        self.replica.on_channel_failure(err.to_string());
        err
    }
}
