// ABOUTME: The Frame type surfaced by FrameReader and accepted by FrameWriter
// ABOUTME: One of METHOD, HEADER, BODY or HEARTBEAT, tagged by AMQP frame type

use crate::methods::Method;
use crate::properties::BasicProperties;
use bytes::Bytes;

/// A complete AMQP frame, decoded from or destined for the wire.
///
/// AMQP framing has no `{ channel, payload }` value representing "nothing
/// decoded yet" — that's purely an artifact of C APIs that decode into an
/// out-parameter. [`crate::codec::FrameDecoder`] returns `Option<Frame>`
/// instead, so there is no sentinel frame type to guard against: a `None`
/// return already says "no frame yet," and [`FramePayload`] only has
/// variants for the four real AMQP frame types.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub channel: u16,
    pub payload: FramePayload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FramePayload {
    Method(Method),
    Header {
        class_id: u16,
        body_size: u64,
        properties: BasicProperties,
    },
    Body(Bytes),
    Heartbeat,
}

impl Frame {
    pub fn method(channel: u16, method: Method) -> Frame {
        Frame {
            channel,
            payload: FramePayload::Method(method),
        }
    }

    /// `Some((class_id, method_id))` if this is a METHOD frame.
    pub fn method_id(&self) -> Option<(u16, u16)> {
        match &self.payload {
            FramePayload::Method(m) => Some(m.id()),
            _ => None,
        }
    }
}
