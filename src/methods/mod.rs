// ABOUTME: The closed tagged union of AMQP methods this client core understands
// ABOUTME: One variant per method, carrying its fully decoded fields

pub mod basic;
pub mod channel;
pub mod connection;

use crate::codec::CodecError;
use bytes::BytesMut;
use std::io::Cursor;

/// A fully decoded AMQP method.
///
/// Only the methods the handshake and publish paths actually use are
/// represented — this core never receives or sends any other method, so
/// there is no catch-all `Unknown` fallback variant.
#[derive(Clone, Debug, PartialEq)]
pub enum Method {
    ConnectionStart(connection::Start),
    ConnectionStartOk(connection::StartOk),
    ConnectionTune(connection::Tune),
    ConnectionTuneOk(connection::TuneOk),
    ConnectionOpen(connection::Open),
    ConnectionOpenOk(connection::OpenOk),
    ConnectionClose(connection::Close),
    ConnectionCloseOk(connection::CloseOk),
    ChannelOpen(channel::Open),
    ChannelOpenOk(channel::OpenOk),
    ChannelClose(channel::Close),
    ChannelCloseOk(channel::CloseOk),
    BasicPublish(basic::Publish),
}

/// `(class_id, method_id)` — the two u16 fields AMQP prefixes every method
/// frame's payload with, and how `simple_rpc` recognizes an expected reply
/// without needing to fully decode it first.
pub type MethodId = (u16, u16);

pub const CONNECTION_CLOSE_ID: MethodId = (connection::CLASS_ID, connection::method_id::CLOSE);
pub const CHANNEL_CLOSE_ID: MethodId = (channel::CLASS_ID, channel::method_id::CLOSE);

impl Method {
    /// The `(class_id, method_id)` pair identifying this method on the wire.
    pub fn id(&self) -> MethodId {
        match self {
            Method::ConnectionStart(_) => (connection::CLASS_ID, connection::method_id::START),
            Method::ConnectionStartOk(_) => {
                (connection::CLASS_ID, connection::method_id::START_OK)
            }
            Method::ConnectionTune(_) => (connection::CLASS_ID, connection::method_id::TUNE),
            Method::ConnectionTuneOk(_) => (connection::CLASS_ID, connection::method_id::TUNE_OK),
            Method::ConnectionOpen(_) => (connection::CLASS_ID, connection::method_id::OPEN),
            Method::ConnectionOpenOk(_) => (connection::CLASS_ID, connection::method_id::OPEN_OK),
            Method::ConnectionClose(_) => (connection::CLASS_ID, connection::method_id::CLOSE),
            Method::ConnectionCloseOk(_) => {
                (connection::CLASS_ID, connection::method_id::CLOSE_OK)
            }
            Method::ChannelOpen(_) => (channel::CLASS_ID, channel::method_id::OPEN),
            Method::ChannelOpenOk(_) => (channel::CLASS_ID, channel::method_id::OPEN_OK),
            Method::ChannelClose(_) => (channel::CLASS_ID, channel::method_id::CLOSE),
            Method::ChannelCloseOk(_) => (channel::CLASS_ID, channel::method_id::CLOSE_OK),
            Method::BasicPublish(_) => (basic::CLASS_ID, basic::method_id::PUBLISH),
        }
    }

    /// `true` if this is a `connection.close` or `channel.close` — the two
    /// methods `simple_rpc` treats as an acceptable substitute for the
    /// expected reply.
    pub fn is_close_notification(&self) -> bool {
        matches!(self, Method::ConnectionClose(_) | Method::ChannelClose(_))
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            Method::ConnectionStart(m) => m.encode(buf),
            Method::ConnectionStartOk(m) => m.encode(buf),
            Method::ConnectionTune(m) => m.encode(buf),
            Method::ConnectionTuneOk(m) => m.encode(buf),
            Method::ConnectionOpen(m) => m.encode(buf),
            Method::ConnectionOpenOk(m) => m.encode(buf),
            Method::ConnectionClose(m) => m.encode(buf),
            Method::ConnectionCloseOk(m) => m.encode(buf),
            Method::ChannelOpen(m) => m.encode(buf),
            Method::ChannelOpenOk(m) => m.encode(buf),
            Method::ChannelClose(m) => m.encode(buf),
            Method::ChannelCloseOk(m) => m.encode(buf),
            Method::BasicPublish(m) => m.encode(buf),
        }
    }

    /// Decode a method given the `(class_id, method_id)` already read off
    /// the frame payload by [`crate::codec`]. A small, closed registry: any
    /// id pair outside this table is a decode error rather than silently
    /// accepted.
    pub fn decode(id: MethodId, buf: &mut Cursor<&[u8]>) -> Result<Method, CodecError> {
        use basic::method_id as bm;
        use channel::method_id as cm;
        use connection::method_id as nm;

        Ok(match id {
            (connection::CLASS_ID, nm::START) => {
                Method::ConnectionStart(connection::Start::decode(buf)?)
            }
            (connection::CLASS_ID, nm::START_OK) => {
                Method::ConnectionStartOk(connection::StartOk::decode(buf)?)
            }
            (connection::CLASS_ID, nm::TUNE) => {
                Method::ConnectionTune(connection::Tune::decode(buf)?)
            }
            (connection::CLASS_ID, nm::TUNE_OK) => {
                Method::ConnectionTuneOk(connection::TuneOk::decode(buf)?)
            }
            (connection::CLASS_ID, nm::OPEN) => {
                Method::ConnectionOpen(connection::Open::decode(buf)?)
            }
            (connection::CLASS_ID, nm::OPEN_OK) => {
                Method::ConnectionOpenOk(connection::OpenOk::decode(buf)?)
            }
            (connection::CLASS_ID, nm::CLOSE) => {
                Method::ConnectionClose(connection::Close::decode(buf)?)
            }
            (connection::CLASS_ID, nm::CLOSE_OK) => {
                Method::ConnectionCloseOk(connection::CloseOk::decode(buf)?)
            }
            (channel::CLASS_ID, cm::OPEN) => Method::ChannelOpen(channel::Open::decode(buf)?),
            (channel::CLASS_ID, cm::OPEN_OK) => {
                Method::ChannelOpenOk(channel::OpenOk::decode(buf)?)
            }
            (channel::CLASS_ID, cm::CLOSE) => Method::ChannelClose(channel::Close::decode(buf)?),
            (channel::CLASS_ID, cm::CLOSE_OK) => {
                Method::ChannelCloseOk(channel::CloseOk::decode(buf)?)
            }
            (basic::CLASS_ID, bm::PUBLISH) => Method::BasicPublish(basic::Publish::decode(buf)?),
            (class_id, method_id) => {
                return Err(CodecError::UnsupportedMethod { class_id, method_id });
            }
        })
    }
}
