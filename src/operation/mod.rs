//! Operations and the offset transform
//!
//! An [`Operation`] replaces one range of the buffer. Two operations created
//! concurrently on the two replicas are reconciled with [`transform_pair`],
//! which rebases each over the other so both application orders produce the
//! same text.
//!
//! # Example
//!
//! ```rust
//! use textsync_core::{transform_pair, Operation, Origin, OverlapPolicy, TextBuffer, TextRange};
//!
//! let local = Operation::new(TextRange::point(3), "d", Origin::Local, 1);
//! let remote = Operation::new(TextRange::point(0), "x", Origin::Remote, 1);
//! let (local2, remote2) = transform_pair(&local, &remote, true, OverlapPolicy::default());
//!
//! let mut here = TextBuffer::from("abc");
//! here.apply(remote.start(), remote.end(), remote.text()).unwrap();
//! here.apply(local2.op.start(), local2.op.end(), local2.op.text()).unwrap();
//!
//! let mut there = TextBuffer::from("abc");
//! there.apply(local.start(), local.end(), local.text()).unwrap();
//! there.apply(remote2.start(), remote2.end(), remote2.text()).unwrap();
//!
//! assert_eq!(here.to_string(), "xabcd");
//! assert_eq!(here, there);
//! ```

mod op;
mod transform;

pub use op::{Operation, Origin};
pub use transform::{map_offset, transform, transform_pair, Bias, OverlapPolicy, Rebased};
