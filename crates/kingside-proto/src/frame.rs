//! Frame envelope.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{EventName, ProtoError};

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    /// Fire-and-forget event.
    Event(EventName),
    /// Request expecting one [`FrameKind::Reply`] with the same id.
    Request {
        /// Command name.
        name: EventName,
        /// Sender-local request id.
        request_id: u64,
    },
    /// Reply to an earlier request.
    Reply {
        /// Id of the request being answered.
        request_id: u64,
    },
}

/// A single message on the channel.
///
/// The body is the CBOR encoding of the payload type associated with the
/// event name (or [`crate::Ack`] for replies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Routing information.
    pub kind: FrameKind,
    /// CBOR payload.
    pub body: Vec<u8>,
}

impl Frame {
    /// Build an event frame.
    pub fn event<T: Serialize>(name: EventName, payload: &T) -> Result<Self, ProtoError> {
        Ok(Self { kind: FrameKind::Event(name), body: to_cbor(payload)? })
    }

    /// Build a request frame.
    pub fn request<T: Serialize>(
        name: EventName,
        request_id: u64,
        payload: &T,
    ) -> Result<Self, ProtoError> {
        Ok(Self { kind: FrameKind::Request { name, request_id }, body: to_cbor(payload)? })
    }

    /// Build a reply frame.
    pub fn reply<T: Serialize>(request_id: u64, payload: &T) -> Result<Self, ProtoError> {
        Ok(Self { kind: FrameKind::Reply { request_id }, body: to_cbor(payload)? })
    }

    /// Event or command name, `None` for replies.
    pub fn name(&self) -> Option<EventName> {
        match self.kind {
            FrameKind::Event(name) | FrameKind::Request { name, .. } => Some(name),
            FrameKind::Reply { .. } => None,
        }
    }

    /// Decode the body as `T`.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, ProtoError> {
        from_cbor(&self.body)
    }

    /// Serialize the whole frame, appending to `dst`.
    pub fn encode(&self, dst: &mut Vec<u8>) -> Result<(), ProtoError> {
        ciborium::ser::into_writer(self, dst).map_err(|e| ProtoError::Encode(e.to_string()))
    }

    /// Parse a frame produced by [`Frame::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtoError> {
        from_cbor(bytes)
    }
}

fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtoError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(value, &mut bytes).map_err(|e| ProtoError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtoError> {
    ciborium::de::from_reader(bytes).map_err(|e| ProtoError::Decode(e.to_string()))
}
