// ABOUTME: Scoped byte scratch space used while encoding methods and frame headers
// ABOUTME: See DESIGN.md for why this degenerates to a single reusable buffer

use bytes::{Bytes, BytesMut};

/// A length-tagged view over bytes.
///
/// An arena-backed client might have this borrow from a pool region whose
/// lifetime outlives any frame referencing it only by convention between the
/// pool and its caller. Here it is simply [`bytes::Bytes`]: a
/// reference-counted, independently-owned byte range. Any clone is valid for
/// as long as it is held, so nothing downstream ever has to reason about
/// outstanding borrows into pool memory.
pub type ByteSlice = Bytes;

/// Scratch space for encoding outbound frames.
///
/// Decoded methods and queued frames own their bytes independently
/// (`Bytes`/`String` — see DESIGN.md), so nothing aliases pool memory and
/// `FramePool` degenerates to a single reusable `BytesMut` buffer plus a
/// generation counter used only to make `release_buffers` observable in
/// tests and traces.
#[derive(Debug, Default)]
pub struct FramePool {
    scratch: BytesMut,
    generation: u64,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the scratch buffer for one encode pass. Callers are expected
    /// to `clear()` it themselves via [`FramePool::release_buffers`] between
    /// uses; this type does not clear on every borrow so that a single
    /// `send_frame` can build up a frame across a few `put_*` calls.
    pub fn scratch_mut(&mut self) -> &mut BytesMut {
        &mut self.scratch
    }

    /// Unconditionally reset the scratch buffer.
    ///
    /// Called unconditionally at handshake checkpoints where, by
    /// construction, nothing still references pool memory.
    pub fn release_buffers(&mut self) {
        self.scratch.clear();
        self.generation += 1;
    }

    /// Reset the scratch buffer only if `queue_empty` holds.
    ///
    /// Called after RPCs that may have parked frames on the
    /// [`crate::queue::FrameQueue`]. With owned queued frames this is no
    /// longer load-bearing for memory safety, but the conditional is kept so
    /// a caller relying on `generation()` to detect a reset still observes
    /// the same condition a pool with aliased queue memory would require.
    pub fn maybe_release_buffers(&mut self, queue_empty: bool) {
        if queue_empty {
            self.release_buffers();
        }
    }

    /// Monotonic counter bumped on every successful reset. Exposed for
    /// tests asserting that a reset did or did not happen.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_buffers_is_idempotent() {
        let mut pool = FramePool::new();
        pool.scratch_mut().extend_from_slice(b"abc");
        pool.release_buffers();
        let gen_after_first = pool.generation();
        pool.release_buffers();
        assert_eq!(pool.generation(), gen_after_first + 1);
        assert!(pool.scratch_mut().is_empty());
    }

    #[test]
    fn maybe_release_buffers_skips_reset_when_queue_nonempty() {
        let mut pool = FramePool::new();
        pool.scratch_mut().extend_from_slice(b"xyz");
        pool.maybe_release_buffers(false);
        assert_eq!(pool.scratch_mut().len(), 3);
        pool.maybe_release_buffers(true);
        assert!(pool.scratch_mut().is_empty());
    }
}
