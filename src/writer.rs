// ABOUTME: Encodes a Frame and writes it to the stream in full
// ABOUTME: Mirrors amqp_send_frame / amqp_send_method (amqp_socket.c)

use crate::codec::encode_frame;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::methods::Method;
use crate::pool::FramePool;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Serializes frames onto a byte stream.
pub struct FrameWriter<W> {
    stream: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(stream: W) -> Self {
        FrameWriter { stream }
    }

    /// Encode `frame` into `pool`'s scratch buffer and write it in full.
    ///
    /// `write_all` either writes the whole frame or fails; there is no
    /// partial-write case to recover from.
    pub async fn send_frame(&mut self, frame: &Frame, pool: &mut FramePool) -> Result<()> {
        pool.release_buffers();
        encode_frame(frame, pool.scratch_mut());
        self.stream.write_all(pool.scratch_mut()).await.map_err(Error::Io)?;
        self.stream.flush().await.map_err(Error::Io)?;
        pool.release_buffers();
        Ok(())
    }

    /// Construct a METHOD frame on `channel` and forward it to
    /// [`FrameWriter::send_frame`].
    pub async fn send_method(
        &mut self,
        channel: u16,
        method: Method,
        pool: &mut FramePool,
    ) -> Result<()> {
        self.send_frame(&Frame::method(channel, method), pool).await
    }

    /// Write the 8-octet protocol preamble that opens every connection,
    /// before any framed traffic.
    pub async fn write_preamble(&mut self, major: u8, minor: u8) -> Result<()> {
        let header = [b'A', b'M', b'Q', b'P', 1, 1, major, minor];
        self.stream.write_all(&header).await.map_err(Error::Io)?;
        self.stream.flush().await.map_err(Error::Io)?;
        Ok(())
    }
}
