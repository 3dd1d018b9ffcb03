// ABOUTME: Owns reader, writer, pool and queue; exposes the public protocol operations
// ABOUTME: login runs the scripted handshake; basic_publish streams a message's frames

use crate::codec::{FOOTER_SIZE, HEADER_SIZE};
use crate::error::{Error, LoginError, Result, RpcReply};
use crate::frame::{Frame, FramePayload};
use crate::methods::{basic, channel, connection, Method, MethodId};
use crate::pool::FramePool;
use crate::properties::BasicProperties;
use crate::queue::FrameQueue;
use crate::reader::FrameReader;
use crate::sasl::SaslCredentials;
use crate::writer::FrameWriter;
use bytes::Bytes;
use tokio::io::{split, AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

/// AMQP 0-9-1: the two version octets sent after the fixed `'A' 'M' 'Q' 'P'
/// 1 1` preamble prefix.
pub const PROTOCOL_MAJOR: u8 = 9;
pub const PROTOCOL_MINOR: u8 = 1;

/// The caller's preferred frame-size ceiling before negotiation — RabbitMQ's
/// own default, used here as this client's starting offer.
pub const DEFAULT_FRAME_MAX: u32 = 131_072;

/// Parameters for [`Connection::login`].
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Ceiling this client proposes for the negotiated frame size; the
    /// server may lower it.
    ///
    /// AMQP 0-9-1 mandates a wire-level minimum of 4096 bytes for this
    /// value, but this client does not validate it (see DESIGN.md, "Open
    /// Questions resolved").
    pub frame_max: u32,
    pub vhost: String,
    pub credentials: SaslCredentials,
}

impl ConnectionConfig {
    /// A config authenticating with SASL PLAIN against `vhost`, proposing
    /// [`DEFAULT_FRAME_MAX`].
    pub fn plain(
        vhost: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        ConnectionConfig {
            frame_max: DEFAULT_FRAME_MAX,
            vhost: vhost.into(),
            credentials: SaslCredentials::Plain {
                username: username.into(),
                password: password.into(),
            },
        }
    }

    /// Override the proposed frame-size ceiling.
    pub fn with_frame_max(mut self, frame_max: u32) -> Self {
        self.frame_max = frame_max;
        self
    }
}

/// The connection-level state machine: handshake, synchronous RPC, and
/// streaming publish over a single split byte stream.
///
/// Generic over the underlying stream so tests can drive it over an
/// in-memory duplex pipe or a `TcpStream` (see [`Connection::connect`])
/// without the core depending on `tokio::net` directly.
pub struct Connection<S> {
    reader: FrameReader<ReadHalf<S>>,
    writer: FrameWriter<WriteHalf<S>>,
    pool: FramePool,
    queue: FrameQueue,
    frame_max: u32,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wrap an already-connected stream. `frame_max` is this client's
    /// initial preference; `login` may lower it per the server's reply.
    pub fn new(stream: S, frame_max: u32) -> Self {
        let (read_half, write_half) = split(stream);
        Connection {
            reader: FrameReader::new(read_half),
            writer: FrameWriter::new(write_half),
            pool: FramePool::new(),
            queue: FrameQueue::new(),
            frame_max,
        }
    }

    /// The frame size currently in effect — the caller's preference until
    /// `login` negotiates it down.
    pub fn frame_max(&self) -> u32 {
        self.frame_max
    }

    /// `true` iff frames are parked awaiting delivery via
    /// [`Connection::wait_frame`].
    pub fn frames_enqueued(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Drain the [`FrameQueue`] before falling through to the reader,
    /// preserving on-wire order for frames buffered during a prior RPC.
    pub async fn wait_frame(&mut self) -> Result<Frame> {
        if let Some(frame) = self.queue.pop_front() {
            return Ok(frame);
        }
        self.reader.wait_frame().await?.ok_or(Error::UnexpectedEof)
    }

    /// Wait for a frame and assert it is a METHOD frame, optionally with a
    /// specific `(class_id, method_id)`. A mismatch is a fatal assertion: a
    /// bug, not a recoverable condition.
    pub async fn simple_wait_method(&mut self, expected: Option<MethodId>) -> Result<Method> {
        let frame = self.wait_frame().await?;
        match frame.payload {
            FramePayload::Method(method) => {
                assert!(
                    expected.map_or(true, |id| method.id() == id),
                    "expected method {expected:?}, got {:?}",
                    method.id()
                );
                Ok(method)
            }
            other => panic!("expected a METHOD frame, got {other:?}"),
        }
    }

    /// Construct and send a METHOD frame on `channel`.
    pub async fn send_method(&mut self, channel: u16, method: Method) -> Result<()> {
        self.writer.send_method(channel, method, &mut self.pool).await
    }

    /// Send `request` and wait for either `expected_reply_id` or a close
    /// notification on `channel`, buffering everything else for later
    /// delivery.
    pub async fn simple_rpc(
        &mut self,
        channel: u16,
        request: Method,
        expected_reply_id: MethodId,
    ) -> RpcReply {
        if let Err(e) = self.send_method(channel, request).await {
            return RpcReply::LibraryException(e);
        }

        loop {
            let frame = match self.reader.wait_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => return RpcReply::LibraryException(Error::UnexpectedEof),
                Err(e) => return RpcReply::LibraryException(e),
            };

            let matches_reply = matches!(
                &frame.payload,
                FramePayload::Method(method)
                    if frame.channel == channel
                        && (method.id() == expected_reply_id || method.is_close_notification())
            );

            if !matches_reply {
                self.queue.push_back(frame);
                continue;
            }

            return match frame.payload {
                FramePayload::Method(method) if method.id() == expected_reply_id => {
                    RpcReply::Normal(method)
                }
                FramePayload::Method(method) => {
                    tracing::warn!(channel, method_id = ?method.id(), "server closed during RPC");
                    RpcReply::ServerException(method)
                }
                _ => unreachable!("matches_reply only holds for METHOD frames"),
            };
        }
    }

    /// The scripted handshake: preamble, SASL, tuning, `CONNECTION.OPEN`,
    /// `CHANNEL.OPEN` on channel 1.
    #[tracing::instrument(skip(self, config), fields(vhost = %config.vhost))]
    pub async fn login(&mut self, config: ConnectionConfig) -> std::result::Result<(), LoginError> {
        tracing::debug!("sending protocol preamble");
        self.writer
            .write_preamble(PROTOCOL_MAJOR, PROTOCOL_MINOR)
            .await?;

        let start = match self
            .simple_wait_method(Some((connection::CLASS_ID, connection::method_id::START)))
            .await?
        {
            Method::ConnectionStart(start) => start,
            other => unreachable!("simple_wait_method guarantees the id matched: {other:?}"),
        };
        if (start.version_major, start.version_minor) != (PROTOCOL_MAJOR, PROTOCOL_MINOR) {
            tracing::warn!(
                server_major = start.version_major,
                server_minor = start.version_minor,
                "protocol version mismatch"
            );
            return Err(LoginError::ProtocolMismatch {
                expected: (PROTOCOL_MAJOR, PROTOCOL_MINOR),
                actual: (start.version_major, start.version_minor),
            });
        }

        let start_ok = connection::StartOk {
            client_properties: Bytes::new(),
            mechanism: config.credentials.mechanism().to_string(),
            response: config.credentials.response(),
            locale: "en_US".to_string(),
        };
        self.send_method(0, Method::ConnectionStartOk(start_ok)).await?;
        self.pool.release_buffers();

        let tune = match self
            .simple_wait_method(Some((connection::CLASS_ID, connection::method_id::TUNE)))
            .await?
        {
            Method::ConnectionTune(tune) => tune,
            other => unreachable!("simple_wait_method guarantees the id matched: {other:?}"),
        };
        self.frame_max = if tune.frame_max == 0 {
            self.frame_max
        } else {
            self.frame_max.min(tune.frame_max)
        };
        tracing::debug!(frame_max = self.frame_max, "negotiated frame_max");

        let tune_ok = connection::TuneOk {
            channel_max: 1,
            frame_max: self.frame_max,
            heartbeat: 0,
        };
        self.send_method(0, Method::ConnectionTuneOk(tune_ok)).await?;
        self.pool.release_buffers();

        let open = connection::Open {
            virtual_host: config.vhost,
            capabilities: String::new(),
            insist: true,
        };
        match self
            .simple_rpc(
                0,
                Method::ConnectionOpen(open),
                (connection::CLASS_ID, connection::method_id::OPEN_OK),
            )
            .await
        {
            RpcReply::Normal(_) => {}
            other => return Err(LoginError::Failed(other)),
        }
        self.pool.maybe_release_buffers(self.queue.is_empty());

        match self
            .simple_rpc(
                1,
                Method::ChannelOpen(channel::Open::default()),
                (channel::CLASS_ID, channel::method_id::OPEN_OK),
            )
            .await
        {
            RpcReply::Normal(_) => {}
            other => return Err(LoginError::Failed(other)),
        }
        self.pool.maybe_release_buffers(self.queue.is_empty());

        tracing::debug!("login complete, channel 1 open");
        Ok(())
    }

    /// Publish one message on channel 1: a METHOD, a HEADER, then zero or
    /// more BODY fragments bounded by the negotiated `frame_max`.
    pub async fn basic_publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        mandatory: bool,
        immediate: bool,
        properties: Option<BasicProperties>,
        body: &[u8],
    ) -> Result<()> {
        let publish = basic::Publish {
            ticket: 0,
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            mandatory,
            immediate,
        };
        self.send_method(1, Method::BasicPublish(publish)).await?;

        let header = Frame {
            channel: 1,
            payload: FramePayload::Header {
                class_id: basic::CLASS_ID,
                body_size: body.len() as u64,
                properties: properties.unwrap_or_default(),
            },
        };
        self.writer.send_frame(&header, &mut self.pool).await?;

        let usable = (self.frame_max as usize).saturating_sub(HEADER_SIZE + FOOTER_SIZE);
        let mut offset = 0;
        while offset < body.len() {
            let take = usable.min(body.len() - offset);
            let fragment = Frame {
                channel: 1,
                payload: FramePayload::Body(Bytes::copy_from_slice(&body[offset..offset + take])),
            };
            self.writer.send_frame(&fragment, &mut self.pool).await?;
            offset += take;
        }

        Ok(())
    }

    /// Acknowledge a server-initiated close on `channel`. `channel == 0`
    /// sends `connection.close-ok`; any other channel sends
    /// `channel.close-ok`.
    pub async fn close_ok(&mut self, channel: u16) -> Result<()> {
        let method = if channel == 0 {
            Method::ConnectionCloseOk(connection::CloseOk)
        } else {
            Method::ChannelCloseOk(channel::CloseOk)
        };
        self.send_method(channel, method).await
    }
}

impl Connection<TcpStream> {
    /// Connect to `addr` and run [`Connection::login`] in one step.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        config: ConnectionConfig,
    ) -> std::result::Result<Self, LoginError> {
        let frame_max = config.frame_max;
        let stream = TcpStream::connect(addr).await.map_err(Error::Io)?;
        let mut connection = Connection::new(stream, frame_max);
        connection.login(config).await?;
        Ok(connection)
    }
}
