//! PendingQueue: local operations applied but not yet acknowledged
//!
//! Entries are kept in send order. Each is expressed against the committed
//! buffer with every earlier entry applied, so replaying the queue in order
//! onto the committed buffer reproduces the visible buffer.

use crate::error::{ProtocolViolation, Result, SyncError};
use crate::operation::{transform_pair, Operation, OverlapPolicy};
use std::collections::VecDeque;

// Time tracking only available on non-WASM targets
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// One unacknowledged local operation
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub op: Operation,

    /// When the operation was queued for sending
    #[cfg(not(target_arch = "wasm32"))]
    pub sent_at: Instant,
}

/// Outcome of rebasing the queue over one remote operation
#[derive(Debug, Clone)]
pub struct QueueRebase {
    /// The remote operation carried past every entry, i.e. what lands on
    /// the visible buffer
    pub landed: Operation,

    /// Entries whose range overlapped the remote operation
    pub affected: usize,
}

/// FIFO of unacknowledged local operations
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    entries: VecDeque<PendingEntry>,
    capacity: Option<usize>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that refuses entries beyond `capacity`
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Fail with `Backpressure` if another entry would not fit
    pub fn check_capacity(&self) -> Result<()> {
        match self.capacity {
            Some(capacity) if self.entries.len() >= capacity => {
                Err(SyncError::Backpressure { capacity })
            }
            _ => Ok(()),
        }
    }

    pub fn head(&self) -> Option<&PendingEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.entries.iter().map(|entry| &entry.op)
    }

    /// Append a freshly applied local operation
    pub fn push(&mut self, op: Operation) -> Result<()> {
        self.check_capacity()?;
        self.entries.push_back(PendingEntry {
            op,
            #[cfg(not(target_arch = "wasm32"))]
            sent_at: Instant::now(),
        });
        Ok(())
    }

    /// Remove the head if it carries `sequence`
    ///
    /// # Errors
    ///
    /// `ProtocolViolation::UnexpectedAck` if the queue is empty or its head has
    /// another sequence. The queue is unchanged in that case.
    pub fn acknowledge(&mut self, sequence: u64) -> Result<Operation> {
        let expected = self.entries.front().map(|entry| entry.op.sequence());
        if expected != Some(sequence) {
            return Err(ProtocolViolation::UnexpectedAck {
                expected,
                received: sequence,
            }
            .into());
        }

        match self.entries.pop_front() {
            Some(entry) => Ok(entry.op),
            None => Err(ProtocolViolation::UnexpectedAck {
                expected,
                received: sequence,
            }
            .into()),
        }
    }

    /// Rebase every entry, in order, over a remote operation
    ///
    /// The remote operation is carried forward past each entry so the next
    /// entry is rebased against the remote edit as it looks after its
    /// predecessors.
    pub fn rebase(
        &mut self,
        remote: Operation,
        local_wins_ties: bool,
        policy: OverlapPolicy,
    ) -> QueueRebase {
        let mut landed = remote;
        let mut affected = 0;

        for entry in self.entries.iter_mut() {
            let (local, remote) = transform_pair(&entry.op, &landed, local_wins_ties, policy);
            if local.affected {
                affected += 1;
            }
            entry.op = local.op;
            landed = remote;
        }

        QueueRebase { landed, affected }
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Origin;
    use crate::range::TextRange;

    fn local(start: usize, end: usize, text: &str, sequence: u64) -> Operation {
        Operation::new(TextRange::new(start, end), text, Origin::Local, sequence)
    }

    #[test]
    fn test_fifo_acknowledge() {
        let mut queue = PendingQueue::new();
        queue.push(local(0, 0, "a", 1)).unwrap();
        queue.push(local(1, 1, "b", 2)).unwrap();

        assert_eq!(queue.acknowledge(1).unwrap().text(), "a");
        assert_eq!(queue.acknowledge(2).unwrap().text(), "b");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_out_of_order_ack() {
        let mut queue = PendingQueue::new();
        queue.push(local(0, 0, "a", 1)).unwrap();
        queue.push(local(1, 1, "b", 2)).unwrap();

        let err = queue.acknowledge(2).unwrap_err();
        assert_eq!(
            err,
            SyncError::Protocol(ProtocolViolation::UnexpectedAck {
                expected: Some(1),
                received: 2
            })
        );
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_ack_on_empty_queue() {
        let mut queue = PendingQueue::new();
        let err = queue.acknowledge(1).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Protocol(ProtocolViolation::UnexpectedAck { expected: None, .. })
        ));
    }

    #[test]
    fn test_bounded_queue() {
        let mut queue = PendingQueue::bounded(1);
        queue.push(local(0, 0, "a", 1)).unwrap();

        assert_eq!(
            queue.push(local(1, 1, "b", 2)),
            Err(SyncError::Backpressure { capacity: 1 })
        );
        assert_eq!(queue.len(), 1);

        queue.acknowledge(1).unwrap();
        assert!(queue.push(local(1, 1, "b", 2)).is_ok());
    }

    #[test]
    fn test_rebase_carries_remote_forward() {
        // "abc": local "zz"@0 then "e"@3 (after 'a'); remote "x"@2 (before 'c')
        let mut queue = PendingQueue::new();
        queue.push(local(0, 0, "zz", 1)).unwrap();
        queue.push(local(3, 3, "e", 2)).unwrap();

        let remote = Operation::new(TextRange::point(2), "x", Origin::Remote, 1);
        let rebase = queue.rebase(remote, true, OverlapPolicy::default());

        let ops: Vec<_> = queue.iter().cloned().collect();
        assert_eq!(ops[0].range(), TextRange::point(0));
        assert_eq!(ops[1].range(), TextRange::point(3));
        assert_eq!(rebase.landed.range(), TextRange::point(5));
        assert_eq!(rebase.affected, 0);
    }

    #[test]
    fn test_rebase_counts_overlaps() {
        let mut queue = PendingQueue::new();
        queue.push(local(1, 4, "P", 1)).unwrap();

        let remote = Operation::new(TextRange::new(2, 6), "Q", Origin::Remote, 1);
        let rebase = queue.rebase(remote, true, OverlapPolicy::default());

        assert_eq!(rebase.affected, 1);
        assert_eq!(queue.head().unwrap().op.range(), TextRange::new(1, 2));
    }
}
