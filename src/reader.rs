// ABOUTME: Pulls bytes off the stream, feeds the codec, yields complete Frames
// ABOUTME: A fixed read buffer with offset/limit cursors, refilled only once fully drained

use crate::codec::FrameDecoder;
use crate::error::{Error, Result};
use crate::frame::Frame;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Size of the fixed inbound buffer a [`FrameReader`] reads into.
///
/// A fixed 128 KiB buffer covers the default negotiated frame size with
/// headroom and is refilled as needed regardless of how large a single
/// frame turns out to be — `FrameDecoder` accumulates across as many fills
/// as a frame requires.
const INBOUND_BUFFER_SIZE: usize = 128 * 1024;

/// Reconstructs a sequence of [`Frame`]s out of a byte stream.
///
/// Owns a fixed `offset`/`limit` read buffer and drives [`FrameDecoder`]
/// over it: present whatever unconsumed bytes remain, advance past what the
/// codec consumed, and only issue a fresh `read` once the buffer is fully
/// drained.
pub struct FrameReader<R> {
    stream: R,
    buffer: Vec<u8>,
    offset: usize,
    limit: usize,
    decoder: FrameDecoder,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(stream: R) -> Self {
        FrameReader {
            stream,
            buffer: vec![0u8; INBOUND_BUFFER_SIZE],
            offset: 0,
            limit: 0,
            decoder: FrameDecoder::new(),
        }
    }

    /// Block until a complete frame has been decoded, the stream closes
    /// cleanly, or a transport/codec error occurs.
    ///
    /// `Ok(None)` signals clean EOF; any other failure — including a short
    /// read reported as an OS error — comes back as `Err`.
    pub async fn wait_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            debug_assert!(self.offset <= self.limit && self.limit <= self.buffer.len());

            if self.offset < self.limit {
                let (consumed, frame) = self
                    .decoder
                    .handle_input(&self.buffer[self.offset..self.limit])?;
                assert!(
                    consumed > 0 || frame.is_some(),
                    "codec produced no frame and consumed zero bytes: a codec bug"
                );
                self.offset += consumed;
                if let Some(frame) = frame {
                    return Ok(Some(frame));
                }
                continue;
            }

            self.offset = 0;
            self.limit = 0;
            let n = self.stream.read(&mut self.buffer).await.map_err(Error::Io)?;
            if n == 0 {
                return Ok(None);
            }
            self.limit = n;
        }
    }
}
