//! In-process channel over `std::sync::mpsc`
//!
//! Messages cross as encoded frames, so both endpoints exercise the same
//! codec a network transport would.

use super::Channel;
use crate::error::{Result, SyncError};
use crate::protocol::serialize;
use crate::protocol::WireMessage;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Frame encoding used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    Json,

    /// Protobuf frames
    #[cfg(feature = "protocol-binary")]
    Binary,
}

impl Codec {
    fn encode(self, msg: &WireMessage) -> Result<Vec<u8>> {
        match self {
            Codec::Json => serialize::encode_json(msg),
            #[cfg(feature = "protocol-binary")]
            Codec::Binary => Ok(serialize::encode_binary(msg)?.to_vec()),
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<WireMessage> {
        match self {
            Codec::Json => serialize::decode_json(bytes),
            #[cfg(feature = "protocol-binary")]
            Codec::Binary => serialize::decode_binary(bytes),
        }
    }
}

/// One end of an in-process channel
///
/// # Example
///
/// ```rust
/// use textsync_core::{Channel, MemoryChannel, WireMessage};
///
/// let (mut a, mut b) = MemoryChannel::pair();
/// a.send(&WireMessage::ack(1)).unwrap();
///
/// assert_eq!(b.try_recv().unwrap(), Some(WireMessage::ack(1)));
/// assert_eq!(b.try_recv().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct MemoryChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    codec: Codec,
}

impl MemoryChannel {
    /// Two connected endpoints exchanging JSON frames
    pub fn pair() -> (Self, Self) {
        Self::pair_with_codec(Codec::Json)
    }

    pub fn pair_with_codec(codec: Codec) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (
            Self {
                tx: a_tx,
                rx: a_rx,
                codec,
            },
            Self {
                tx: b_tx,
                rx: b_rx,
                codec,
            },
        )
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, msg: &WireMessage) -> Result<()> {
        let frame = self.codec.encode(msg)?;
        self.tx.send(frame).map_err(|_| SyncError::ChannelClosed)
    }

    fn try_recv(&mut self) -> Result<Option<WireMessage>> {
        match self.rx.try_recv() {
            Ok(frame) => self.codec.decode(&frame).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SyncError::ChannelClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo() {
        let (mut a, mut b) = MemoryChannel::pair();
        for sequence in 1..=3 {
            a.send(&WireMessage::ack(sequence)).unwrap();
        }

        let received: Vec<_> = std::iter::from_fn(|| b.try_recv().unwrap()).collect();
        assert_eq!(
            received,
            vec![WireMessage::ack(1), WireMessage::ack(2), WireMessage::ack(3)]
        );
    }

    #[test]
    fn test_directions_are_independent() {
        let (mut a, mut b) = MemoryChannel::pair();
        a.send(&WireMessage::ack(1)).unwrap();

        assert_eq!(a.try_recv().unwrap(), None);
        assert_eq!(b.try_recv().unwrap(), Some(WireMessage::ack(1)));
    }

    #[test]
    fn test_dropped_peer() {
        let (mut a, b) = MemoryChannel::pair();
        drop(b);

        assert_eq!(a.send(&WireMessage::ack(1)), Err(SyncError::ChannelClosed));
        assert_eq!(a.try_recv(), Err(SyncError::ChannelClosed));
    }

    #[test]
    fn test_queued_frames_survive_peer_drop() {
        let (mut a, mut b) = MemoryChannel::pair();
        b.send(&WireMessage::ack(4)).unwrap();
        drop(b);

        assert_eq!(a.try_recv().unwrap(), Some(WireMessage::ack(4)));
        assert_eq!(a.try_recv(), Err(SyncError::ChannelClosed));
    }

    #[test]
    #[cfg(feature = "protocol-binary")]
    fn test_binary_codec() {
        let (mut a, mut b) = MemoryChannel::pair_with_codec(Codec::Binary);
        let msg = WireMessage::Edit {
            sequence: 1,
            range_start: 0,
            range_end: 1,
            inserted_text: "é".to_string(),
        };
        a.send(&msg).unwrap();
        assert_eq!(b.try_recv().unwrap(), Some(msg));
    }
}
