//! Core connection state machine for an AMQP 0-9-1 client: protocol
//! handshake, synchronous method RPC, and streaming publish over a single
//! byte stream.
//!
//! This crate does not own a socket implementation, a DNS resolver, or a
//! codec for every AMQP method and property table — it consumes an
//! already-connected [`tokio::io::AsyncRead`] + [`tokio::io::AsyncWrite`]
//! stream and a small internal codec covering exactly the methods the
//! handshake and publish paths use. See [`Connection`] for the entry point.

pub mod codec;
pub mod connection;
pub mod error;
pub mod frame;
pub mod methods;
pub mod pool;
pub mod properties;
pub mod queue;
pub mod reader;
pub mod sasl;
pub mod writer;

pub use codec::CodecError;
pub use connection::{Connection, ConnectionConfig};
pub use error::{Error, LoginError, Result, RpcReply};
pub use frame::{Frame, FramePayload};
pub use methods::Method;
pub use properties::BasicProperties;
pub use sasl::SaslCredentials;
