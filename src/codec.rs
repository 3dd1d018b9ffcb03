// ABOUTME: Wire-level frame envelope codec: accumulates bytes into complete Frames
// ABOUTME: Also home to the primitive AMQP field encodings methods/*.rs build on

use crate::frame::{Frame, FramePayload};
use crate::methods::Method;
use crate::properties::BasicProperties;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::io::Cursor;
use thiserror::Error;

/// Bytes of wire overhead before a frame's payload: 1 (type) + 2 (channel) +
/// 4 (length). Used by the publish path to size body fragments.
pub const HEADER_SIZE: usize = 7;
/// The trailing frame-end octet.
pub const FOOTER_SIZE: usize = 1;
/// `0xCE`, the frame-end marker every AMQP 0-9-1 frame is terminated with.
pub const FRAME_END: u8 = 0xCE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum FrameType {
    Method = 1,
    Header = 2,
    Body = 3,
    Heartbeat = 8,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("need more data")]
    Incomplete,

    #[error("unrecognized frame type byte {0:#x}")]
    InvalidFrameType(u8),

    #[error("frame missing the {FRAME_END:#x} end marker, found {0:#x}")]
    MissingFrameEnd(u8),

    #[error("no method body for class {class_id} method {method_id}")]
    UnsupportedMethod { class_id: u16, method_id: u16 },

    #[error("invalid UTF-8 in field '{field}': {source}")]
    Utf8 {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

// --- primitive field helpers, shared by src/methods/*.rs --------------------

pub fn decode_u8(buf: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u8())
}

pub fn decode_u16(buf: &mut Cursor<&[u8]>) -> Result<u16, CodecError> {
    if buf.remaining() < 2 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u16())
}

pub fn decode_u32(buf: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u32())
}

pub fn decode_u64(buf: &mut Cursor<&[u8]>) -> Result<u64, CodecError> {
    if buf.remaining() < 8 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u64())
}

/// AMQP `short string`: one length octet followed by that many UTF-8 bytes.
pub fn encode_short_string(buf: &mut BytesMut, s: &str) {
    buf.put_u8(s.len() as u8);
    buf.extend_from_slice(s.as_bytes());
}

pub fn decode_short_string(
    buf: &mut Cursor<&[u8]>,
    field: &'static str,
) -> Result<String, CodecError> {
    let len = decode_u8(buf)? as usize;
    if buf.remaining() < len {
        return Err(CodecError::Incomplete);
    }
    let bytes = buf.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec()).map_err(|source| CodecError::Utf8 { field, source })
}

/// AMQP `long string` / field-table payload: a four-byte length followed by
/// that many raw bytes. Fields of this shape (`client_properties`,
/// `server_properties`, `mechanisms`, `locales`, the SASL `response` blob)
/// are carried as opaque [`Bytes`] rather than parsed into entries, since
/// nothing on the handshake or publish paths inspects their contents —
/// full field-table parsing is out of scope for a core that only needs to
/// forward these bytes unread.
pub fn encode_long_bytes(buf: &mut BytesMut, b: &[u8]) {
    buf.put_u32(b.len() as u32);
    buf.extend_from_slice(b);
}

pub fn decode_long_bytes(buf: &mut Cursor<&[u8]>) -> Result<Bytes, CodecError> {
    let len = decode_u32(buf)? as usize;
    if buf.remaining() < len {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.copy_to_bytes(len))
}

/// Encode a run of up to 8 booleans into one AMQP `bit`-packed octet,
/// lowest-indexed flag in bit 0, matching how e.g. `connection.open`'s
/// `insist` and `basic.publish`'s `mandatory`/`immediate` are packed.
pub fn encode_bits(flags: &[bool]) -> u8 {
    debug_assert!(flags.len() <= 8);
    flags
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &set)| if set { acc | (1 << i) } else { acc })
}

pub fn decode_bit(byte: u8, index: u8) -> bool {
    byte & (1 << index) != 0
}

// --- frame envelope ----------------------------------------------------------

/// Encode a complete [`Frame`] — envelope, payload, and end marker — into
/// `buf`. The caller supplies the scratch buffer (see
/// [`crate::pool::FramePool`]).
pub fn encode_frame(frame: &Frame, buf: &mut BytesMut) {
    let (frame_type, mut payload) = match &frame.payload {
        FramePayload::Method(method) => {
            let mut p = BytesMut::new();
            let (class_id, method_id) = method.id();
            p.put_u16(class_id);
            p.put_u16(method_id);
            method.encode(&mut p);
            (FrameType::Method, p)
        }
        FramePayload::Header {
            class_id,
            body_size,
            properties,
        } => {
            let mut p = BytesMut::new();
            p.put_u16(*class_id);
            p.put_u16(0); // weight, always zero
            p.put_u64(*body_size);
            p.put_u16(properties.flags);
            p.extend_from_slice(&properties.raw);
            (FrameType::Header, p)
        }
        FramePayload::Body(bytes) => {
            let mut p = BytesMut::with_capacity(bytes.len());
            p.extend_from_slice(bytes);
            (FrameType::Body, p)
        }
        FramePayload::Heartbeat => (FrameType::Heartbeat, BytesMut::new()),
    };

    buf.put_u8(frame_type.into());
    buf.put_u16(frame.channel);
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(&payload.split_to(payload.len()));
    buf.put_u8(FRAME_END);
}

/// Incremental decoder for the frame envelope.
///
/// Callers feed it whatever prefix of the inbound buffer is currently
/// available; it reports how many bytes it consumed and, once a complete
/// frame has been accumulated, the decoded frame itself. `FrameDecoder`
/// holds the accumulator state across calls so a frame split across
/// arbitrarily many reads decodes the same way a single contiguous read
/// would. Because a `None` return already says "no frame yet," there is no
/// sentinel to smuggle through — any wire byte that isn't one of the four
/// known frame types is a decode error rather than "frame not ready."
#[derive(Debug, Default)]
pub struct FrameDecoder {
    scratch: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn required_len(&self) -> usize {
        if self.scratch.len() < HEADER_SIZE {
            HEADER_SIZE
        } else {
            let payload_len = u32::from_be_bytes([
                self.scratch[3],
                self.scratch[4],
                self.scratch[5],
                self.scratch[6],
            ]) as usize;
            HEADER_SIZE + payload_len + FOOTER_SIZE
        }
    }

    /// Feed `buf` (a prefix of the reader's inbound buffer) to the decoder.
    ///
    /// Returns the number of bytes consumed and, once a full frame has been
    /// accumulated, the decoded [`Frame`]. Consumes at least one byte of a
    /// non-empty `buf` whenever it does not also return a frame, satisfying
    /// the forward-progress half of the codec contract by construction: a
    /// completed frame is always parsed and the scratch buffer cleared
    /// within the same call that completes it, so a caller never observes
    /// "already complete, nothing consumed."
    #[tracing::instrument(level = "trace", skip(self, buf), fields(buf_len = buf.len()))]
    pub fn handle_input(&mut self, buf: &[u8]) -> Result<(usize, Option<Frame>), CodecError> {
        // Looping here (rather than taking one `need`-sized bite and
        // returning) matters once a chunk boundary falls inside the first 7
        // bytes: appending the header tail changes `required_len`'s answer,
        // and the rest of `buf` should be consumed against that new answer
        // in the same call instead of being handed back to the caller.
        let mut consumed = 0;
        while consumed < buf.len() {
            let need = self.required_len() - self.scratch.len();
            if need == 0 {
                break;
            }
            let take = need.min(buf.len() - consumed);
            self.scratch.extend_from_slice(&buf[consumed..consumed + take]);
            consumed += take;
            if self.scratch.len() >= self.required_len() {
                break;
            }
        }

        if self.scratch.len() < self.required_len() {
            return Ok((consumed, None));
        }

        let frame = self.parse_complete()?;
        self.scratch.clear();
        Ok((consumed, Some(frame)))
    }

    fn parse_complete(&self) -> Result<Frame, CodecError> {
        let frame_type_byte = self.scratch[0];
        let frame_type = FrameType::try_from(frame_type_byte)
            .map_err(|_| CodecError::InvalidFrameType(frame_type_byte))?;
        let channel = u16::from_be_bytes([self.scratch[1], self.scratch[2]]);
        let payload_len = u32::from_be_bytes([
            self.scratch[3],
            self.scratch[4],
            self.scratch[5],
            self.scratch[6],
        ]) as usize;
        let payload = &self.scratch[HEADER_SIZE..HEADER_SIZE + payload_len];
        let end = self.scratch[HEADER_SIZE + payload_len];
        if end != FRAME_END {
            tracing::warn!(found = format!("{end:#x}"), "frame missing end marker");
            return Err(CodecError::MissingFrameEnd(end));
        }

        let mut cursor = Cursor::new(payload);
        let payload = match frame_type {
            FrameType::Method => {
                let class_id = decode_u16(&mut cursor)?;
                let method_id = decode_u16(&mut cursor)?;
                FramePayload::Method(Method::decode((class_id, method_id), &mut cursor)?)
            }
            FrameType::Header => {
                let class_id = decode_u16(&mut cursor)?;
                let _weight = decode_u16(&mut cursor)?;
                let body_size = decode_u64(&mut cursor)?;
                let flags = decode_u16(&mut cursor)?;
                let raw = Bytes::copy_from_slice(&payload[cursor.position() as usize..]);
                FramePayload::Header {
                    class_id,
                    body_size,
                    properties: BasicProperties { flags, raw },
                }
            }
            FrameType::Body => FramePayload::Body(Bytes::copy_from_slice(payload)),
            FrameType::Heartbeat => FramePayload::Heartbeat,
        };

        Ok(Frame { channel, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::connection::CloseOk;

    #[test]
    fn round_trips_a_heartbeat_frame() {
        let frame = Frame {
            channel: 0,
            payload: FramePayload::Heartbeat,
        };
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf);
        assert_eq!(buf.len(), HEADER_SIZE + FOOTER_SIZE);

        let mut decoder = FrameDecoder::new();
        let (consumed, decoded) = decoder.handle_input(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert!(matches!(decoded.unwrap().payload, FramePayload::Heartbeat));
    }

    #[test]
    fn round_trips_a_method_frame_across_fragmented_reads() {
        let frame = Frame {
            channel: 1,
            payload: FramePayload::Method(Method::ConnectionCloseOk(CloseOk)),
        };
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf);

        let mut decoder = FrameDecoder::new();
        let mut total_consumed = 0;
        let mut produced = None;
        for chunk in buf.chunks(3) {
            let (consumed, frame) = decoder.handle_input(chunk).unwrap();
            total_consumed += consumed;
            // every byte of a short chunk must be consumed: the decoder
            // must never report zero progress on non-empty input.
            assert!(consumed > 0 || frame.is_some());
            if let Some(f) = frame {
                produced = Some(f);
            }
        }
        assert_eq!(total_consumed, buf.len());
        let produced = produced.expect("frame should have been produced");
        assert_eq!(produced.channel, 1);
        assert!(matches!(
            produced.payload,
            FramePayload::Method(Method::ConnectionCloseOk(_))
        ));
    }

    #[test]
    fn rejects_bad_frame_end_marker() {
        let frame = Frame {
            channel: 0,
            payload: FramePayload::Heartbeat,
        };
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf);
        let last = buf.len() - 1;
        buf[last] = 0x00;

        let mut decoder = FrameDecoder::new();
        let err = decoder.handle_input(&buf).unwrap_err();
        assert!(matches!(err, CodecError::MissingFrameEnd(0x00)));
    }
}
