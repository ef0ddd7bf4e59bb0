//! OffsetTransform: move an operation past another one applied ahead of it
//!
//! Both operations are based on the same buffer state `S`. `transform(b, a)`
//! returns `b'` valid on `apply(S, a)`, and the pair satisfies
//!
//! ```text
//! apply(apply(S, a), transform(b, a)) == apply(apply(S, b), transform(a, b))
//! ```
//!
//! as long as exactly one of the two sides wins ties. The replicas pick that
//! side from their [`Site`](crate::Site).

use super::op::Operation;
use crate::range::TextRange;
use serde::{Deserialize, Serialize};

/// How two edits whose ranges overlap are merged
///
/// In both policies the union of the two ranges is deleted once and both
/// inserted texts survive; they differ in which text comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Clamp to the other edit's boundary; texts ordered by start offset,
    /// equal starts ordered by site
    #[default]
    ClampPreserve,

    /// Clamp to the other edit's boundary; the Primary site's text always first
    PrimaryFirst,
}

/// Which way an offset sitting exactly on an insertion point moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Stay before the inserted text
    Left,
    /// Move past the inserted text
    Right,
}

/// Result of rebasing one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebased {
    pub op: Operation,

    /// The two ranges overlapped and the overlap policy decided the outcome
    pub affected: bool,
}

/// Rebase `pending` over `applied`
///
/// Rules, first match wins:
///
/// 0. Both are insertions at the same offset: the tie winner goes first.
/// 1. `applied` ends at or before `pending` starts: shift by `applied.delta()`.
/// 2. `applied` starts at or after `pending` ends: unchanged.
/// 3. Overlap: `pending` is clamped to the nearest boundary of `applied`
///    and flagged affected (see [`OverlapPolicy`]).
///
/// # Example
///
/// ```rust
/// use textsync_core::{transform, Operation, Origin, OverlapPolicy, TextRange};
///
/// let pending = Operation::new(TextRange::point(3), "d", Origin::Local, 1);
/// let remote = Operation::new(TextRange::point(0), "x", Origin::Remote, 1);
///
/// let rebased = transform(&pending, &remote, true, OverlapPolicy::default());
/// assert_eq!(rebased.op.range(), TextRange::point(4));
/// assert!(!rebased.affected);
/// ```
pub fn transform(
    pending: &Operation,
    applied: &Operation,
    pending_wins_ties: bool,
    policy: OverlapPolicy,
) -> Rebased {
    let (p_start, p_end) = (pending.start(), pending.end());
    let (a_start, a_end) = (applied.start(), applied.end());

    if pending.is_insert() && applied.is_insert() && p_start == a_start {
        if pending_wins_ties {
            return unaffected(pending.clone());
        }
        let point = TextRange::point(p_start + applied.text_len());
        return unaffected(pending.rebased(point, pending.text().to_string()));
    }

    if a_end <= p_start {
        let range = TextRange::new(shift(p_start, applied), shift(p_end, applied));
        return unaffected(pending.rebased(range, pending.text().to_string()));
    }

    if a_start >= p_end {
        return unaffected(pending.clone());
    }

    let pending_first = match policy {
        OverlapPolicy::ClampPreserve => {
            p_start < a_start || (p_start == a_start && pending_wins_ties)
        }
        OverlapPolicy::PrimaryFirst => pending_wins_ties,
    };
    let after_applied = a_start + applied.text_len();

    let start = if p_start < a_start {
        p_start
    } else if pending_first {
        a_start
    } else {
        after_applied
    };
    let end = if p_end > a_end {
        shift(p_end, applied)
    } else if pending_first {
        a_start
    } else {
        after_applied
    };

    // The surviving range covers `applied`'s text; put it back in order.
    let spans_applied =
        (p_end > a_end && (pending_first || p_start < a_start)) || (p_start < a_start && !pending_first);
    let text = if !spans_applied {
        pending.text().to_string()
    } else if pending_first {
        format!("{}{}", pending.text(), applied.text())
    } else {
        format!("{}{}", applied.text(), pending.text())
    };

    Rebased {
        op: pending.rebased(TextRange::new(start, end), text),
        affected: true,
    }
}

/// Rebase two concurrent operations over each other
///
/// Returns `(local', remote')`: `local'` applies after `remote`, `remote'`
/// applies after `local`.
pub fn transform_pair(
    local: &Operation,
    remote: &Operation,
    local_wins_ties: bool,
    policy: OverlapPolicy,
) -> (Rebased, Operation) {
    let local_rebased = transform(local, remote, local_wins_ties, policy);
    let remote_rebased = transform(remote, local, !local_wins_ties, policy).op;
    (local_rebased, remote_rebased)
}

/// Where `offset` ends up after `op` is applied
///
/// Monotonic in `offset`. Offsets inside the replaced range land at the end
/// of the inserted text.
pub fn map_offset(offset: usize, op: &Operation, bias: Bias) -> usize {
    let before = match bias {
        Bias::Left => offset <= op.start(),
        Bias::Right => offset < op.start(),
    };
    if before {
        offset
    } else if offset >= op.end() {
        shift(offset, op)
    } else {
        op.start() + op.text_len()
    }
}

/// Offset at or after `op.end()`, expressed after `op`
fn shift(offset: usize, op: &Operation) -> usize {
    offset - op.end() + op.start() + op.text_len()
}

fn unaffected(op: Operation) -> Rebased {
    Rebased {
        op,
        affected: false,
    }
}
