// ABOUTME: connection-class methods used by the handshake (start..close)
// ABOUTME: Field shapes follow the AMQP 0-9-1 connection class exactly

use crate::codec::{
    CodecError, decode_long_bytes, decode_short_string, decode_u16, decode_u32, decode_u8,
    decode_bit, encode_bits, encode_long_bytes, encode_short_string,
};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Cursor;

pub const CLASS_ID: u16 = 10;

pub mod method_id {
    pub const START: u16 = 10;
    pub const START_OK: u16 = 11;
    pub const TUNE: u16 = 30;
    pub const TUNE_OK: u16 = 31;
    pub const OPEN: u16 = 40;
    pub const OPEN_OK: u16 = 41;
    pub const CLOSE: u16 = 50;
    pub const CLOSE_OK: u16 = 51;
}

/// `connection.start`, sent by the server as the first frame after the
/// protocol preamble. `server_properties`, `mechanisms` and `locales` are
/// carried opaquely (see [`crate::codec::decode_long_bytes`]) — this client
/// only ever reads `version_major`/`version_minor` out of it and does not
/// cross-check the chosen SASL mechanism against `mechanisms` (see
/// DESIGN.md, "Open Questions resolved").
#[derive(Clone, Debug, PartialEq)]
pub struct Start {
    pub version_major: u8,
    pub version_minor: u8,
    pub server_properties: Bytes,
    pub mechanisms: Bytes,
    pub locales: Bytes,
}

impl Start {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Start {
            version_major: decode_u8(buf)?,
            version_minor: decode_u8(buf)?,
            server_properties: decode_long_bytes(buf)?,
            mechanisms: decode_long_bytes(buf)?,
            locales: decode_long_bytes(buf)?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.version_major);
        buf.put_u8(self.version_minor);
        encode_long_bytes(buf, &self.server_properties);
        encode_long_bytes(buf, &self.mechanisms);
        encode_long_bytes(buf, &self.locales);
    }
}

/// `connection.start-ok`, this client's SASL response.
#[derive(Clone, Debug, PartialEq)]
pub struct StartOk {
    pub client_properties: Bytes,
    pub mechanism: String,
    pub response: Bytes,
    pub locale: String,
}

impl StartOk {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(StartOk {
            client_properties: decode_long_bytes(buf)?,
            mechanism: decode_short_string(buf, "mechanism")?,
            response: decode_long_bytes(buf)?,
            locale: decode_short_string(buf, "locale")?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        encode_long_bytes(buf, &self.client_properties);
        encode_short_string(buf, &self.mechanism);
        encode_long_bytes(buf, &self.response);
        encode_short_string(buf, &self.locale);
    }
}

/// `connection.tune`, carrying the server's preferred transport limits.
#[derive(Clone, Debug, PartialEq)]
pub struct Tune {
    pub channel_max: u16,
    pub frame_max: u32,
    pub heartbeat: u16,
}

impl Tune {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Tune {
            channel_max: decode_u16(buf)?,
            frame_max: decode_u32(buf)?,
            heartbeat: decode_u16(buf)?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.channel_max);
        buf.put_u32(self.frame_max);
        buf.put_u16(self.heartbeat);
    }
}

/// `connection.tune-ok`, this client's negotiated reply. `channel_max` is
/// hard-coded to 1 by the caller — a library-imposed restriction, not a
/// protocol one (see DESIGN.md, "Open Questions resolved").
#[derive(Clone, Debug, PartialEq)]
pub struct TuneOk {
    pub channel_max: u16,
    pub frame_max: u32,
    pub heartbeat: u16,
}

impl TuneOk {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(TuneOk {
            channel_max: decode_u16(buf)?,
            frame_max: decode_u32(buf)?,
            heartbeat: decode_u16(buf)?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.channel_max);
        buf.put_u32(self.frame_max);
        buf.put_u16(self.heartbeat);
    }
}

/// `connection.open`.
#[derive(Clone, Debug, PartialEq)]
pub struct Open {
    pub virtual_host: String,
    pub capabilities: String,
    pub insist: bool,
}

impl Open {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let virtual_host = decode_short_string(buf, "virtual_host")?;
        let capabilities = decode_short_string(buf, "capabilities")?;
        let flags = decode_u8(buf)?;
        Ok(Open {
            virtual_host,
            capabilities,
            insist: decode_bit(flags, 0),
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        encode_short_string(buf, &self.virtual_host);
        encode_short_string(buf, &self.capabilities);
        buf.put_u8(encode_bits(&[self.insist]));
    }
}

/// `connection.open-ok`. The lone field is a deprecated reserved string
/// (historically `known_hosts`); kept only so the reply decodes cleanly.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenOk {
    pub reserved_1: String,
}

impl OpenOk {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(OpenOk {
            reserved_1: decode_short_string(buf, "reserved_1")?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        encode_short_string(buf, &self.reserved_1);
    }
}

/// `connection.close`, the method `simple_rpc` treats as an acceptable
/// substitute reply during any connection-channel (0) RPC.
#[derive(Clone, Debug, PartialEq)]
pub struct Close {
    pub reply_code: u16,
    pub reply_text: String,
    pub class_id: u16,
    pub method_id: u16,
}

impl Close {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Close {
            reply_code: decode_u16(buf)?,
            reply_text: decode_short_string(buf, "reply_text")?,
            class_id: decode_u16(buf)?,
            method_id: decode_u16(buf)?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.reply_code);
        encode_short_string(buf, &self.reply_text);
        buf.put_u16(self.class_id);
        buf.put_u16(self.method_id);
    }
}

/// `connection.close-ok`, sent to acknowledge a server-initiated
/// `connection.close` (see SPEC_FULL.md §C.4 / `Connection::close_ok`).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CloseOk;

impl CloseOk {
    pub(crate) fn decode(_buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(CloseOk)
    }

    pub(crate) fn encode(&self, _buf: &mut BytesMut) {}
}
