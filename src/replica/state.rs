//! Replica: one side of the dual-replica protocol
//!
//! A replica keeps two buffers. `committed` holds every operation both sides
//! have seen: remote edits as they arrive and local edits once ACKed.
//! `visible` is `committed` with the pending queue replayed on top; it is
//! maintained incrementally instead of being recomputed.

use super::event::{DegradedReason, ReplicaEvent};
use super::pending::PendingQueue;
use super::snapshot::Snapshot;
use crate::buffer::TextBuffer;
use crate::config::ReplicaConfig;
use crate::error::{ProtocolViolation, Result, SyncError};
use crate::operation::{map_offset, Bias, Operation, Origin};
use crate::protocol::WireMessage;
use crate::range::{Selection, TextRange};
use crate::ReplicaID;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

// Time tracking only available on non-WASM targets
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// One of the two cooperating replicas
///
/// Entry points never block: outgoing messages are queued on an outbox
/// (`drain_outgoing`) and notifications on an event list (`drain_events`).
/// The embedding layer moves them to the channel and the view.
///
/// # Example
///
/// ```rust
/// use textsync_core::{Replica, ReplicaConfig};
///
/// let mut input = Replica::with_text("input".to_string(), ReplicaConfig::primary(), "abc");
/// let mut logic = Replica::with_text("logic".to_string(), ReplicaConfig::secondary(), "abc");
///
/// input.submit_local_edit(3, 3, "d").unwrap();
/// logic.submit_local_edit(0, 0, "x").unwrap();
///
/// // Cross the messages over; ACKs flow back on the next exchange
/// for _ in 0..2 {
///     for msg in logic.drain_outgoing() {
///         input.receive(msg).unwrap();
///     }
///     for msg in input.drain_outgoing() {
///         logic.receive(msg).unwrap();
///     }
/// }
///
/// assert_eq!(input.text(), "xabcd");
/// assert_eq!(logic.text(), "xabcd");
/// assert!(input.is_quiescent() && logic.is_quiescent());
/// ```
#[derive(Debug)]
pub struct Replica {
    id: ReplicaID,
    config: ReplicaConfig,
    session_id: Uuid,

    committed: TextBuffer,
    visible: TextBuffer,
    selection: Selection,
    pending: PendingQueue,

    /// Last sequence assigned to a local edit
    last_local_seq: u64,

    /// Last sequence received from the peer
    last_remote_seq: u64,

    outbox: VecDeque<WireMessage>,
    events: Vec<ReplicaEvent>,

    /// Set by a fatal protocol error; cleared by `reset`
    failure: Option<String>,

    /// Last reported degradation, while it lasts
    degraded: Option<DegradedReason>,

    /// Pending entries rebased under the overlap policy so far
    conflicts: u64,

    /// Sequence of the pending head already reported as stalled
    stalled_on: Option<u64>,
}

impl Replica {
    /// Create a replica with an empty buffer
    pub fn new(id: ReplicaID, config: ReplicaConfig) -> Self {
        Self::with_text(id, config, "")
    }

    /// Create a replica holding `text`, caret at the end
    ///
    /// Both replicas of a session must start from the same text.
    pub fn with_text(id: ReplicaID, config: ReplicaConfig, text: &str) -> Self {
        let pending = match config.max_pending {
            Some(capacity) => PendingQueue::bounded(capacity),
            None => PendingQueue::new(),
        };
        let buffer = TextBuffer::from(text);

        Self {
            id,
            config,
            session_id: Uuid::nil(),
            selection: Selection::caret(buffer.len()),
            committed: buffer.clone(),
            visible: buffer,
            pending,
            last_local_seq: 0,
            last_remote_seq: 0,
            outbox: VecDeque::new(),
            events: Vec::new(),
            failure: None,
            degraded: None,
            conflicts: 0,
            stalled_on: None,
        }
    }

    /// Replace the initial selection
    pub fn with_selection(mut self, selection: Selection) -> Result<Self> {
        selection.as_range().validate(self.visible.len())?;
        self.selection = selection;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ReplicaConfig {
        &self.config
    }

    /// Nil until the first `reset`
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Visible text: committed state plus every pending local edit
    pub fn text(&self) -> String {
        self.visible.to_string()
    }

    pub fn visible(&self) -> &TextBuffer {
        &self.visible
    }

    pub fn committed(&self) -> &TextBuffer {
        &self.committed
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    /// No local edit awaits an ACK
    pub fn is_quiescent(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn conflict_count(&self) -> u64 {
        self.conflicts
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// A stall or channel failure was reported and has not cleared
    pub fn degraded(&self) -> Option<&DegradedReason> {
        self.degraded.as_ref()
    }

    pub fn last_remote_sequence(&self) -> u64 {
        self.last_remote_seq
    }

    /// Apply a local edit optimistically and queue it for the peer
    ///
    /// Returns the sequence number assigned to the edit. No event is raised.
    ///
    /// # Errors
    ///
    /// - `SyncError::Range` if the range does not fit the visible buffer
    /// - `SyncError::Backpressure` if the pending window is full
    /// - `SyncError::SessionFailed` after a fatal protocol error
    ///
    /// A rejected edit changes nothing.
    pub fn submit_local_edit(&mut self, start: usize, end: usize, text: &str) -> Result<u64> {
        self.ensure_active()?;
        let range = TextRange::new(start, end);
        range.validate(self.visible.len())?;
        self.pending.check_capacity()?;

        self.visible.apply(start, end, text)?;

        self.last_local_seq += 1;
        let sequence = self.last_local_seq;
        let op = Operation::new(range, text, Origin::Local, sequence);

        self.selection = map_selection(self.selection, &op, Bias::Right);
        self.outbox.push_back(WireMessage::edit(&op));
        self.pending.push(op)?;

        debug!(
            replica = %self.id,
            sequence,
            range = %range,
            pending = self.pending.len(),
            "applied local edit"
        );
        Ok(sequence)
    }

    /// Move the local selection; nothing is sent and no event is raised
    pub fn submit_local_selection(&mut self, start: usize, end: usize) -> Result<()> {
        self.ensure_active()?;
        TextRange::new(start, end).validate(self.visible.len())?;
        self.selection = Selection::new(start, end);
        trace!(replica = %self.id, start, end, "local selection");
        Ok(())
    }

    /// Dispatch one message from the peer
    pub fn receive(&mut self, msg: WireMessage) -> Result<()> {
        match msg {
            WireMessage::Edit {
                sequence,
                range_start,
                range_end,
                inserted_text,
            } => self.on_remote_operation(sequence, range_start, range_end, &inserted_text),
            WireMessage::Ack { sequence } => self.on_ack(sequence),
        }
    }

    /// Apply an edit made by the peer
    ///
    /// The edit is applied to the committed buffer as sent, the pending queue
    /// is rebased over it, and the edit as carried past the queue lands on
    /// the visible buffer. An ACK is queued and `BufferChanged` reports the
    /// landed coordinates.
    ///
    /// # Errors
    ///
    /// `SyncError::Protocol` (fatal) if the sequence is not the next expected
    /// one or the range does not fit the committed buffer.
    pub fn on_remote_operation(
        &mut self,
        sequence: u64,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<()> {
        self.ensure_active()?;

        let expected = self.last_remote_seq + 1;
        if sequence != expected {
            return Err(self.fail(ProtocolViolation::UnexpectedSequence {
                expected,
                received: sequence,
            }));
        }

        let range = TextRange::new(start, end);
        if range.validate(self.committed.len()).is_err() {
            return Err(self.fail(ProtocolViolation::RemoteRange {
                start,
                end,
                length: self.committed.len(),
            }));
        }

        self.committed.apply(start, end, text)?;
        self.last_remote_seq = sequence;

        let op = Operation::new(range, text, Origin::Remote, sequence);
        let rebase = self.pending.rebase(
            op,
            self.config.site.wins_ties(),
            self.config.overlap_policy,
        );
        if rebase.affected > 0 {
            self.conflicts += rebase.affected as u64;
            debug!(
                replica = %self.id,
                sequence,
                affected = rebase.affected,
                policy = ?self.config.overlap_policy,
                "remote edit overlapped pending edits"
            );
        }

        let landed = rebase.landed;
        self.visible.apply(landed.start(), landed.end(), landed.text())?;
        self.outbox.push_back(WireMessage::ack(sequence));

        self.events.push(ReplicaEvent::BufferChanged {
            range: landed.range(),
            text: landed.text().to_string(),
            caused_by: Origin::Remote,
        });
        let selection = map_selection(self.selection, &landed, Bias::Left);
        if selection != self.selection {
            self.selection = selection;
            self.events.push(ReplicaEvent::SelectionChanged { selection });
        }

        debug!(
            replica = %self.id,
            sequence,
            sent = %range,
            landed = %landed.range(),
            pending = self.pending.len(),
            "applied remote edit"
        );
        Ok(())
    }

    /// Commit the pending head acknowledged by the peer
    ///
    /// Only the committed buffer moves; the visible buffer already shows the
    /// edit.
    ///
    /// # Errors
    ///
    /// `SyncError::Protocol` (fatal) if `sequence` is not the pending head.
    pub fn on_ack(&mut self, sequence: u64) -> Result<()> {
        self.ensure_active()?;

        let op = match self.pending.acknowledge(sequence) {
            Ok(op) => op,
            Err(SyncError::Protocol(violation)) => return Err(self.fail(violation)),
            Err(err) => return Err(err),
        };
        self.committed.apply(op.start(), op.end(), op.text())?;

        if self.stalled_on == Some(sequence) {
            self.stalled_on = None;
            if matches!(self.degraded, Some(DegradedReason::AckTimeout { .. })) {
                self.degraded = None;
            }
        }

        trace!(
            replica = %self.id,
            sequence,
            pending = self.pending.len(),
            "committed local edit"
        );
        Ok(())
    }

    /// Report a transport problem to the embedding layer
    pub fn on_channel_failure(&mut self, detail: impl Into<String>) {
        let detail = detail.into();
        warn!(replica = %self.id, %detail, "channel failure, session degraded");
        let reason = DegradedReason::ChannelFailure { detail };
        self.degraded = Some(reason.clone());
        self.events.push(ReplicaEvent::SessionDegraded { reason });
    }

    /// Report the session degraded if the pending head waited too long
    ///
    /// Each stalled head is reported once. Returns whether the head is
    /// currently stalled.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn check_stalled(&mut self, now: Instant) -> bool {
        let Some(head) = self.pending.head() else {
            return false;
        };
        let waited = now.saturating_duration_since(head.sent_at);
        self.check_head_waited(waited)
    }

    /// Report the session degraded if the pending head has waited `waited`
    ///
    /// For hosts that keep their own clock (no `Instant` on wasm32). Same
    /// once-per-head reporting as `check_stalled`.
    pub fn check_head_waited(&mut self, waited: Duration) -> bool {
        let Some(head) = self.pending.head() else {
            return false;
        };
        if waited <= self.config.ack_timeout() {
            return false;
        }

        let sequence = head.op.sequence();
        if self.stalled_on != Some(sequence) {
            self.stalled_on = Some(sequence);
            let waited_ms = waited.as_millis() as u64;
            warn!(
                replica = %self.id,
                sequence,
                waited_ms,
                "ack overdue, session degraded"
            );
            let reason = DegradedReason::AckTimeout {
                sequence,
                waited_ms,
            };
            if !matches!(self.degraded, Some(DegradedReason::ChannelFailure { .. })) {
                self.degraded = Some(reason.clone());
            }
            self.events.push(ReplicaEvent::SessionDegraded { reason });
        }
        true
    }

    /// Take the messages queued for the peer, in send order
    pub fn drain_outgoing(&mut self) -> Vec<WireMessage> {
        self.outbox.drain(..).collect()
    }

    /// Oldest message not yet handed to the channel
    pub fn peek_outgoing(&self) -> Option<&WireMessage> {
        self.outbox.front()
    }

    /// Remove the oldest queued message once it has been sent
    pub fn pop_outgoing(&mut self) -> Option<WireMessage> {
        self.outbox.pop_front()
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Take the notifications raised since the last call
    pub fn drain_events(&mut self) -> Vec<ReplicaEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replay the pending queue onto the committed buffer
    ///
    /// Always equal to the visible buffer; exposed for verification.
    pub fn fold_pending(&self) -> Result<TextBuffer> {
        let mut buffer = self.committed.clone();
        for op in self.pending.iter() {
            buffer.apply(op.start(), op.end(), op.text())?;
        }
        Ok(buffer)
    }

    /// Capture the visible text as the state both sides restart from
    pub fn authoritative_snapshot(&self) -> Snapshot {
        Snapshot::new(self.visible.to_string())
    }

    /// Discard all protocol state and restart from `snapshot`
    ///
    /// Queued outgoing messages are dropped; the embedding layer must not
    /// deliver traffic from the previous session to the new one.
    pub fn reset(&mut self, snapshot: &Snapshot) {
        let buffer = TextBuffer::from(snapshot.text.as_str());
        if buffer != self.visible {
            self.events.push(ReplicaEvent::BufferChanged {
                range: TextRange::new(0, self.visible.len()),
                text: snapshot.text.clone(),
                caused_by: Origin::Remote,
            });
        }

        self.committed = buffer.clone();
        self.visible = buffer;
        self.pending.clear();
        self.last_local_seq = 0;
        self.last_remote_seq = 0;
        self.outbox.clear();
        self.failure = None;
        self.degraded = None;
        self.stalled_on = None;
        self.session_id = snapshot.session_id;

        let selection = self.selection.clamp(self.visible.len());
        if selection != self.selection {
            self.selection = selection;
            self.events.push(ReplicaEvent::SelectionChanged { selection });
        }

        debug!(replica = %self.id, session = %self.session_id, "reset from snapshot");
    }

    fn ensure_active(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(SyncError::SessionFailed(reason.clone())),
            None => Ok(()),
        }
    }

    /// Record a fatal violation and hand back the error to return
    fn fail(&mut self, violation: ProtocolViolation) -> SyncError {
        error!(replica = %self.id, %violation, "protocol violation, session failed");
        let detail = violation.to_string();
        self.failure = Some(detail.clone());
        self.events.push(ReplicaEvent::SessionDegraded {
            reason: DegradedReason::ProtocolViolation { detail },
        });
        SyncError::Protocol(violation)
    }
}

fn map_selection(selection: Selection, op: &Operation, bias: Bias) -> Selection {
    Selection::new(
        map_offset(selection.start, op, bias),
        map_offset(selection.end, op, bias),
    )
}
