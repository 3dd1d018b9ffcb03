// ABOUTME: The `basic` class's per-message property table, carried opaquely

use bytes::Bytes;

/// Properties attached to a published message's HEADER frame.
///
/// `raw` is the pre-encoded property list exactly as it will appear on the
/// wire, opaque to this crate. `flags` is the AMQP basic-properties
/// presence bitmask (content-type, delivery-mode, etc.) that tells a peer
/// how to parse `raw` — this core never needs to, since it only ever
/// forwards a caller-supplied property list unread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicProperties {
    pub flags: u16,
    pub raw: Bytes,
}

impl Default for BasicProperties {
    /// All flags clear, no property fields — substituted when a caller
    /// publishes without supplying properties.
    fn default() -> Self {
        BasicProperties {
            flags: 0,
            raw: Bytes::new(),
        }
    }
}
