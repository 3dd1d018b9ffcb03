// ABOUTME: channel-class methods used to open a channel atop a connection

use crate::codec::{
    CodecError, decode_long_bytes, decode_short_string, decode_u16, encode_long_bytes,
    encode_short_string,
};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Cursor;

pub const CLASS_ID: u16 = 20;

pub mod method_id {
    pub const OPEN: u16 = 10;
    pub const OPEN_OK: u16 = 11;
    pub const CLOSE: u16 = 40;
    pub const CLOSE_OK: u16 = 41;
}

/// `channel.open`. `reserved_1` is a vestigial "out-of-band" shortstr no
/// broker has honored in years; kept only because it's on the wire.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Open {
    pub reserved_1: String,
}

impl Open {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Open {
            reserved_1: decode_short_string(buf, "reserved_1")?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        encode_short_string(buf, &self.reserved_1);
    }
}

/// `channel.open-ok`. `reserved_1` is a deprecated longstr (historically a
/// channel id assignment), carried opaquely.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct OpenOk {
    pub reserved_1: Bytes,
}

impl OpenOk {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(OpenOk {
            reserved_1: decode_long_bytes(buf)?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        encode_long_bytes(buf, &self.reserved_1);
    }
}

/// `channel.close`, the method `simple_rpc` treats as an acceptable
/// substitute reply during a channel RPC.
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

/// `channel.close-ok`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CloseOk;

impl CloseOk {
    pub(crate) fn decode(_buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(CloseOk)
    }

    pub(crate) fn encode(&self, _buf: &mut BytesMut) {}
}
