// ABOUTME: Crate-wide error and result types for the connection state machine
// ABOUTME: RpcReply is the three-way outcome every synchronous exchange resolves to

use crate::methods::Method;
use std::io;
use thiserror::Error;

/// Error returned by the transport, codec and handshake layers.
///
/// Every leaf I/O or decode failure flows up through this type until it
/// reaches a call boundary that returns an [`RpcReply`], where it is folded
/// into [`RpcReply::LibraryException`].
#[derive(Debug, Error)]
pub enum Error {
    /// Read/write/connect failure on the underlying byte stream.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the connection cleanly while a complete frame was
    /// still expected.
    #[error("unexpected EOF while waiting for a frame")]
    UnexpectedEof,

    /// The server announced a protocol version this client does not speak.
    #[error("protocol version mismatch: server offered {actual:?}, expected {expected:?}")]
    ProtocolMismatch {
        expected: (u8, u8),
        actual: (u8, u8),
    },

    /// A frame or method failed to decode from the wire.
    #[error("codec error: {0}")]
    Codec(#[from] crate::codec::CodecError),
}

/// A specialized `Result` type for connection operations that are not
/// themselves an RPC (e.g. raw frame I/O).
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a synchronous request/reply exchange: a request either got
/// the reply it asked for, got told the connection/channel is closing, or
/// never got a reply at all because of a local or transport failure.
#[derive(Debug)]
pub enum RpcReply {
    /// The expected reply method arrived.
    Normal(Method),
    /// The server replied with `connection.close` or `channel.close`
    /// instead of the expected method.
    ServerException(Method),
    /// A transport error, unexpected EOF, or send failure was encountered
    /// before a reply could be observed.
    LibraryException(Error),
}

impl RpcReply {
    /// True if the exchange completed with the expected reply.
    pub fn is_normal(&self) -> bool {
        matches!(self, RpcReply::Normal(_))
    }

    /// Unwraps the expected reply method, panicking on any other outcome.
    ///
    /// Intended for tests and call sites that have already checked
    /// [`RpcReply::is_normal`].
    pub fn expect_normal(self, msg: &str) -> Method {
        match self {
            RpcReply::Normal(method) => method,
            other => panic!("{msg}: {other:?}"),
        }
    }
}

/// Failure during [`crate::connection::Connection::login`].
///
/// Everything before the `CONNECTION.OPEN` RPC can only fail with a protocol
/// mismatch or a library exception (no server can legitimately refuse the
/// handshake with a method-level close that early); from `CONNECTION.OPEN`
/// onward a non-normal [`RpcReply`] is surfaced verbatim.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("protocol version mismatch: server offered {actual:?}, expected {expected:?}")]
    ProtocolMismatch {
        expected: (u8, u8),
        actual: (u8, u8),
    },

    #[error("transport error during login: {0}")]
    Transport(Error),

    #[error("login failed: {0:?}")]
    Failed(RpcReply),
}

impl From<Error> for LoginError {
    fn from(e: Error) -> Self {
        LoginError::Transport(e)
    }
}
