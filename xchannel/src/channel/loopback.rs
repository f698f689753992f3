use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use crate::error::{Error, Result};
use super::AsyncChannel;

/// Observable side of a [`LoopbackChannel`].
///
/// Tests hold a clone of this handle to inspect what the channel saw after
/// it has been handed to a source or sink.
#[derive(Debug, Default)]
pub struct LoopbackState {
    written: Mutex<Vec<u8>>,
    write_calls: Mutex<Vec<Vec<u8>>>,
    closed: AtomicBool,
    reads_issued: AtomicUsize,
}

impl LoopbackState {
    /// All bytes accepted across every write, in order.
    pub fn written(&self) -> Vec<u8> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The bytes accepted by each individual write call.
    pub fn write_calls(&self) -> Vec<Vec<u8>> {
        self.write_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of reads issued against the channel.
    pub fn reads_issued(&self) -> usize {
        self.reads_issued.load(Ordering::Acquire)
    }
}

/// An in-memory channel for testing.
///
/// Reads drain a scripted byte sequence and then report end-of-stream (or a
/// scripted error); writes are captured per call, optionally capped to
/// exercise partial-write handling.
#[derive(Debug)]
pub struct LoopbackChannel {
    incoming: VecDeque<u8>,
    read_error: Option<io::Error>,
    write_error: Option<io::Error>,
    write_caps: VecDeque<usize>,
    close_on_complete: bool,
    state: Arc<LoopbackState>,
}

impl LoopbackChannel {
    /// Creates an empty loopback channel that owns teardown.
    pub fn new() -> Self {
        Self {
            incoming: VecDeque::new(),
            read_error: None,
            write_error: None,
            write_caps: VecDeque::new(),
            close_on_complete: true,
            state: Arc::new(LoopbackState::default()),
        }
    }

    /// Scripts the bytes that reads will deliver before end-of-stream.
    pub fn with_incoming(mut self, bytes: &[u8]) -> Self {
        self.incoming.extend(bytes);
        self
    }

    /// Scripts an error returned once the incoming bytes are drained,
    /// in place of end-of-stream.
    pub fn with_read_error(mut self, error: io::Error) -> Self {
        self.read_error = Some(error);
        self
    }

    /// Scripts an error returned by the next write call.
    pub fn with_write_error(mut self, error: io::Error) -> Self {
        self.write_error = Some(error);
        self
    }

    /// Caps how many bytes the next write calls accept, one cap per call.
    /// Calls beyond the scripted caps accept everything offered.
    pub fn with_write_caps(mut self, caps: &[usize]) -> Self {
        self.write_caps.extend(caps);
        self
    }

    /// Overrides whether this endpoint owns teardown.
    pub fn with_close_on_complete(mut self, owns: bool) -> Self {
        self.close_on_complete = owns;
        self
    }

    /// Returns the observable state handle.
    pub fn state(&self) -> Arc<LoopbackState> {
        Arc::clone(&self.state)
    }
}

impl Default for LoopbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncChannel for LoopbackChannel {
    fn poll_read(&mut self, _cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<Result<usize>> {
        if self.is_closed() {
            return Poll::Ready(Err(Error::ChannelClosed));
        }
        self.state.reads_issued.fetch_add(1, Ordering::AcqRel);

        if self.incoming.is_empty() {
            if let Some(error) = self.read_error.take() {
                return Poll::Ready(Err(Error::Io(error)));
            }
            return Poll::Ready(Ok(0));
        }

        let n = buf.len().min(self.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..n)) {
            *slot = byte;
        }
        Poll::Ready(Ok(n))
    }

    fn poll_write(&mut self, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize>> {
        if self.is_closed() {
            return Poll::Ready(Err(Error::ChannelClosed));
        }
        if let Some(error) = self.write_error.take() {
            return Poll::Ready(Err(Error::Io(error)));
        }

        let cap = self.write_caps.pop_front().unwrap_or(usize::MAX);
        let n = buf.len().min(cap);
        let accepted = &buf[..n];
        self.state
            .written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(accepted);
        self.state
            .write_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(accepted.to_vec());
        Poll::Ready(Ok(n))
    }

    fn poll_shutdown(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.close();
        Poll::Ready(Ok(()))
    }

    fn close(&self) -> bool {
        !self.state.closed.swap(true, Ordering::AcqRel)
    }

    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    fn close_on_complete(&self) -> bool {
        self.close_on_complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::poll_fn;

    #[test]
    fn test_loopback_read_then_eof() {
        let mut channel = LoopbackChannel::new().with_incoming(b"Hello");

        let mut buf = [0u8; 32];
        let n = block_on(poll_fn(|cx| channel.poll_read(cx, &mut buf))).unwrap();
        assert_eq!(&buf[..n], b"Hello");

        let n = block_on(poll_fn(|cx| channel.poll_read(cx, &mut buf))).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_loopback_capped_write() {
        let mut channel = LoopbackChannel::new().with_write_caps(&[2]);

        let n = block_on(poll_fn(|cx| channel.poll_write(cx, b"Hello"))).unwrap();
        assert_eq!(n, 2);

        let n = block_on(poll_fn(|cx| channel.poll_write(cx, b"llo"))).unwrap();
        assert_eq!(n, 3);
        assert_eq!(channel.state().written(), b"Hello");
    }

    #[test]
    fn test_loopback_close_once() {
        let channel = LoopbackChannel::new();
        assert!(channel.close());
        assert!(!channel.close());
        assert!(channel.state().is_closed());
    }
}
