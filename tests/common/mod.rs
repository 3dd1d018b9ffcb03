// ABOUTME: Shared scaffolding for driving a fake broker peer in integration tests

use amqp091_core::codec::{FRAME_END, HEADER_SIZE};
use amqp091_core::frame::{Frame, FramePayload};
use amqp091_core::methods::{channel, connection, Method};
use amqp091_core::pool::FramePool;
use amqp091_core::reader::FrameReader;
use amqp091_core::writer::FrameWriter;
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// The 8-byte preamble every client sends before any framed traffic:
/// `'A' 'M' 'Q' 'P' 0x01 0x01 <Major> <Minor>`.
pub const EXPECTED_PREAMBLE: [u8; 8] = [b'A', b'M', b'Q', b'P', 1, 1, 9, 1];

/// The broker side of a handshake: reads the 8-byte preamble before any
/// framed traffic begins, then exposes the same reader/writer primitives
/// the client uses, so the fake broker scripts its replies with the
/// crate's own framing rather than hand-rolled bytes.
pub struct FakeBroker {
    pub reader: FrameReader<OwnedReadHalf>,
    pub writer: FrameWriter<OwnedWriteHalf>,
    pub pool: FramePool,
}

impl FakeBroker {
    pub async fn accept(mut stream: TcpStream) -> (Self, [u8; 8]) {
        let mut preamble = [0u8; 8];
        stream
            .read_exact(&mut preamble)
            .await
            .expect("client should send the protocol preamble");
        let (read_half, write_half) = stream.into_split();
        (
            FakeBroker {
                reader: FrameReader::new(read_half),
                writer: FrameWriter::new(write_half),
                pool: FramePool::new(),
            },
            preamble,
        )
    }

    pub async fn expect_method(&mut self, channel: u16) -> Method {
        let frame = self
            .reader
            .wait_frame()
            .await
            .expect("transport error waiting for client frame")
            .expect("client closed before sending the expected method");
        assert_eq!(frame.channel, channel, "method arrived on the wrong channel");
        match frame.payload {
            FramePayload::Method(method) => method,
            other => panic!("expected a METHOD frame, got {other:?}"),
        }
    }

    pub async fn send_method(&mut self, channel: u16, method: Method) {
        self.writer
            .send_method(channel, method, &mut self.pool)
            .await
            .expect("broker failed to write a reply frame");
    }

    pub async fn send_frame(&mut self, frame: Frame) {
        self.writer
            .send_frame(&frame, &mut self.pool)
            .await
            .expect("broker failed to write a frame");
    }

    /// Scripts `connection.start` .. `connection.tune-ok`, the first half of
    /// the handshake, advertising `server_frame_max` (`0` meaning
    /// unbounded). Returns the `tune-ok` the client echoed back so callers
    /// can assert the negotiated value, and the `start-ok` so callers can
    /// assert the SASL response.
    pub async fn script_start_and_tune(
        &mut self,
        server_frame_max: u32,
    ) -> (connection::StartOk, connection::TuneOk) {
        self.send_method(
            0,
            Method::ConnectionStart(connection::Start {
                version_major: 9,
                version_minor: 1,
                server_properties: Bytes::new(),
                mechanisms: Bytes::from_static(b"PLAIN"),
                locales: Bytes::from_static(b"en_US"),
            }),
        )
        .await;

        let start_ok = match self.expect_method(0).await {
            Method::ConnectionStartOk(start_ok) => start_ok,
            other => panic!("expected connection.start-ok, got {other:?}"),
        };

        self.send_method(
            0,
            Method::ConnectionTune(connection::Tune {
                channel_max: 0,
                frame_max: server_frame_max,
                heartbeat: 0,
            }),
        )
        .await;

        let tune_ok = match self.expect_method(0).await {
            Method::ConnectionTuneOk(tune_ok) => tune_ok,
            other => panic!("expected connection.tune-ok, got {other:?}"),
        };

        (start_ok, tune_ok)
    }

    /// Scripts `connection.open` / `connection.open-ok`, asserting the
    /// client asked for `expected_vhost`.
    pub async fn script_connection_open(&mut self, expected_vhost: &str) {
        match self.expect_method(0).await {
            Method::ConnectionOpen(open) => assert_eq!(open.virtual_host, expected_vhost),
            other => panic!("expected connection.open, got {other:?}"),
        }
        self.send_method(
            0,
            Method::ConnectionOpenOk(connection::OpenOk {
                reserved_1: String::new(),
            }),
        )
        .await;
    }

    /// Scripts `channel.open` / `channel.open-ok` on channel 1.
    pub async fn script_channel_open(&mut self) {
        match self.expect_method(1).await {
            Method::ChannelOpen(_) => {}
            other => panic!("expected channel.open, got {other:?}"),
        }
        self.send_method(1, Method::ChannelOpenOk(channel::OpenOk::default()))
            .await;
    }
}

pub fn body_fragment_sizes(frame_max: u32, body_len: usize) -> Vec<usize> {
    let usable = (frame_max as usize).saturating_sub(HEADER_SIZE + 1);
    debug_assert!(usable > 0);
    let mut remaining = body_len;
    let mut sizes = Vec::new();
    while remaining > 0 {
        let take = remaining.min(usable);
        sizes.push(take);
        remaining -= take;
    }
    sizes
}

#[allow(dead_code)]
pub const FRAME_END_MARKER: u8 = FRAME_END;
