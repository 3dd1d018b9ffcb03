// ABOUTME: the one `basic` class method this core sends: basic.publish

use crate::codec::{
    CodecError, decode_bit, decode_short_string, decode_u16, encode_bits, encode_short_string,
};
use bytes::{BufMut, BytesMut};
use std::io::Cursor;

pub const CLASS_ID: u16 = 60;

pub mod method_id {
    pub const PUBLISH: u16 = 40;
}

/// `basic.publish`, the method frame that opens a publish.
/// `ticket` is the deprecated access-ticket field every broker since the
/// 0-9-1 revision ignores; the client always sends 0, the server's default.
#[derive(Clone, Debug, PartialEq)]
pub struct Publish {
    pub ticket: u16,
    pub exchange: String,
    pub routing_key: String,
    pub mandatory: bool,
    pub immediate: bool,
}

impl Publish {
    pub(crate) fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let ticket = decode_u16(buf)?;
        let exchange = decode_short_string(buf, "exchange")?;
        let routing_key = decode_short_string(buf, "routing_key")?;
        let flags = crate::codec::decode_u8(buf)?;
        Ok(Publish {
            ticket,
            exchange,
            routing_key,
            mandatory: decode_bit(flags, 0),
            immediate: decode_bit(flags, 1),
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.ticket);
        encode_short_string(buf, &self.exchange);
        encode_short_string(buf, &self.routing_key);
        buf.put_u8(encode_bits(&[self.mandatory, self.immediate]));
    }
}
