//! Channel abstraction over completion-style socket I/O.
//!
//! This module provides the `AsyncChannel` trait that the stream and sink
//! layers are built against, plus the concrete implementations:
//!
//! - `SocketChannel`: wraps any `futures` read/write socket, standalone or
//!   as a reader/writer pair over one shared socket
//! - `LoopbackChannel`: in-memory channel for testing
//!
//! Each poll method issues at most one operation per direction; the task
//! waker takes the place of a completion callback, firing exactly once per
//! completed operation.

mod loopback;
mod socket;

pub use loopback::{LoopbackChannel, LoopbackState};
pub use socket::SocketChannel;

use std::task::{Context, Poll};

use crate::error::Result;

/// One endpoint's capability surface over an asynchronous socket.
///
/// A channel carries both directions, but a given endpoint normally drives
/// only one of them: the reading side issues reads, the writing side issues
/// writes. Close ownership is split so that exactly one endpoint tears the
/// socket down when its stream terminates.
pub trait AsyncChannel: Send + Unpin {
    /// Polls one read into `buf`.
    ///
    /// `Ready(Ok(n))` with `n > 0` delivers bytes, `Ready(Ok(0))` signals
    /// end-of-stream. Fails with `Error::ChannelClosed` once the channel
    /// has been closed.
    fn poll_read(&mut self, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<Result<usize>>;

    /// Polls one write of the bytes in `buf`.
    ///
    /// May accept fewer bytes than given; callers retry from the unwritten
    /// offset until the buffer is drained. Fails with
    /// `Error::ChannelClosed` once the channel has been closed.
    fn poll_write(&mut self, cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize>>;

    /// Drives a graceful shutdown of the underlying socket, then marks the
    /// channel closed. A no-op on an already-closed channel.
    fn poll_shutdown(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>>;

    /// Marks the channel closed.
    ///
    /// Idempotent and single-winner: only the first call over a given
    /// socket transitions the state, and only that call returns `true`.
    fn close(&self) -> bool;

    /// Returns true once the channel has been closed by either endpoint.
    fn is_closed(&self) -> bool;

    /// Whether this endpoint owns socket teardown on stream termination.
    ///
    /// False for the writer half of a duplex pair, so it cannot close a
    /// socket the reader is still draining.
    fn close_on_complete(&self) -> bool;
}
