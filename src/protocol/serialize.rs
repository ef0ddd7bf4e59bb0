//! Serialization layer: wire messages to and from bytes
//!
//! JSON is always available. With the `protocol-binary` feature, messages can
//! also travel as Protocol Buffers frames; the frame types are declared with
//! prost's derive macros so no code generation step is needed.

use super::WireMessage;
use crate::error::Result;

/// Encode a message as a JSON frame
pub fn encode_json(msg: &WireMessage) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(msg)?)
}

/// Decode a JSON frame
pub fn decode_json(bytes: &[u8]) -> Result<WireMessage> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(feature = "protocol-binary")]
pub use binary::{decode_binary, encode_binary, AckFrame, EditFrame, Frame};

#[cfg(feature = "protocol-binary")]
mod binary {
    use super::WireMessage;
    use crate::error::{Result, SyncError};
    use bytes::{Bytes, BytesMut};
    use prost::Message;

    /// Edit body
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EditFrame {
        #[prost(uint64, tag = "1")]
        pub sequence: u64,
        #[prost(uint64, tag = "2")]
        pub range_start: u64,
        #[prost(uint64, tag = "3")]
        pub range_end: u64,
        #[prost(string, tag = "4")]
        pub inserted_text: String,
    }

    /// Ack body
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct AckFrame {
        #[prost(uint64, tag = "1")]
        pub sequence: u64,
    }

    /// Envelope for either body
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Frame {
        #[prost(oneof = "frame::Body", tags = "1, 2")]
        pub body: Option<frame::Body>,
    }

    pub mod frame {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Body {
            #[prost(message, tag = "1")]
            Edit(super::EditFrame),
            #[prost(message, tag = "2")]
            Ack(super::AckFrame),
        }
    }

    impl From<&WireMessage> for Frame {
        fn from(msg: &WireMessage) -> Self {
            let body = match msg {
                WireMessage::Edit {
                    sequence,
                    range_start,
                    range_end,
                    inserted_text,
                } => frame::Body::Edit(EditFrame {
                    sequence: *sequence,
                    range_start: *range_start as u64,
                    range_end: *range_end as u64,
                    inserted_text: inserted_text.clone(),
                }),
                WireMessage::Ack { sequence } => frame::Body::Ack(AckFrame {
                    sequence: *sequence,
                }),
            };
            Frame { body: Some(body) }
        }
    }

    impl TryFrom<Frame> for WireMessage {
        type Error = SyncError;

        fn try_from(frame: Frame) -> Result<Self> {
            match frame.body {
                Some(frame::Body::Edit(edit)) => Ok(WireMessage::Edit {
                    sequence: edit.sequence,
                    range_start: to_offset(edit.range_start)?,
                    range_end: to_offset(edit.range_end)?,
                    inserted_text: edit.inserted_text,
                }),
                Some(frame::Body::Ack(ack)) => Ok(WireMessage::Ack {
                    sequence: ack.sequence,
                }),
                None => Err(SyncError::Serialization(
                    "Frame has no body".to_string(),
                )),
            }
        }
    }

    fn to_offset(value: u64) -> Result<usize> {
        usize::try_from(value)
            .map_err(|_| SyncError::Serialization(format!("Offset {} does not fit usize", value)))
    }

    /// Serialize a message to a protobuf frame
    pub fn encode_binary(msg: &WireMessage) -> Result<Bytes> {
        let frame = Frame::from(msg);
        let mut buf = BytesMut::with_capacity(frame.encoded_len());
        frame
            .encode(&mut buf)
            .map_err(|e| SyncError::Serialization(format!("Failed to encode frame: {}", e)))?;
        Ok(buf.freeze())
    }

    /// Deserialize a message from a protobuf frame
    pub fn decode_binary(bytes: &[u8]) -> Result<WireMessage> {
        let frame = Frame::decode(bytes)
            .map_err(|e| SyncError::Serialization(format!("Failed to decode frame: {}", e)))?;
        WireMessage::try_from(frame)
    }
}
