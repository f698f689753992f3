use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::io::{AsyncRead, AsyncWrite};
use log::trace;

use crate::error::{Error, Result};
use super::AsyncChannel;

/// State shared between the endpoints of one socket: the socket itself and
/// the close-once guard that makes reader/writer close races single-winner.
#[derive(Debug)]
struct Shared<T> {
    io: Mutex<T>,
    closed: AtomicBool,
}

/// Channel endpoint over an asynchronous socket.
///
/// Built either standalone via [`SocketChannel::solo`], or as a
/// reader/writer pair via [`SocketChannel::pair`] where both endpoints wrap
/// the same socket. The socket lock is only ever held inside a single poll
/// call, so the two directions can be in flight concurrently.
#[derive(Debug)]
pub struct SocketChannel<T> {
    shared: Arc<Shared<T>>,
    close_on_complete: bool,
}

impl<T> SocketChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Creates a standalone endpoint that owns socket teardown.
    pub fn solo(io: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                io: Mutex::new(io),
                closed: AtomicBool::new(false),
            }),
            close_on_complete: true,
        }
    }

    /// Creates a `(reader, writer)` endpoint pair over one shared socket.
    ///
    /// The reader owns teardown (`close_on_complete` true); the writer does
    /// not. Both share one close-once guard.
    pub fn pair(io: T) -> (Self, Self) {
        let shared = Arc::new(Shared {
            io: Mutex::new(io),
            closed: AtomicBool::new(false),
        });
        let reader = Self {
            shared: Arc::clone(&shared),
            close_on_complete: true,
        };
        let writer = Self {
            shared,
            close_on_complete: false,
        };
        (reader, writer)
    }

    fn lock_io(&self) -> std::sync::MutexGuard<'_, T> {
        self.shared.io.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> AsyncChannel for SocketChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn poll_read(&mut self, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<Result<usize>> {
        if self.is_closed() {
            return Poll::Ready(Err(Error::ChannelClosed));
        }
        let mut io = self.lock_io();
        Pin::new(&mut *io).poll_read(cx, buf).map_err(Error::Io)
    }

    fn poll_write(&mut self, cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize>> {
        if self.is_closed() {
            return Poll::Ready(Err(Error::ChannelClosed));
        }
        let mut io = self.lock_io();
        Pin::new(&mut *io).poll_write(cx, buf).map_err(Error::Io)
    }

    fn poll_shutdown(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if self.is_closed() {
            return Poll::Ready(Ok(()));
        }
        let result = {
            let mut io = self.lock_io();
            std::task::ready!(Pin::new(&mut *io).poll_close(cx))
        };
        self.close();
        Poll::Ready(result.map_err(Error::Io))
    }

    fn close(&self) -> bool {
        let won = !self.shared.closed.swap(true, Ordering::AcqRel);
        if won {
            trace!("channel closed");
        }
        won
    }

    fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
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
    use futures::io::Cursor;

    #[test]
    fn test_solo_owns_teardown() {
        let channel = SocketChannel::solo(Cursor::new(Vec::new()));
        assert!(channel.close_on_complete());
        assert!(!channel.is_closed());
    }

    #[test]
    fn test_pair_ownership_split() {
        let (reader, writer) = SocketChannel::pair(Cursor::new(Vec::new()));
        assert!(reader.close_on_complete());
        assert!(!writer.close_on_complete());
    }

    #[test]
    fn test_close_is_single_winner() {
        let (reader, writer) = SocketChannel::pair(Cursor::new(Vec::new()));

        assert!(reader.close());
        assert!(!reader.close());
        assert!(!writer.close());
        assert!(reader.is_closed());
        assert!(writer.is_closed());
    }

    #[test]
    fn test_ops_fail_after_close() {
        let (mut reader, mut writer) = SocketChannel::pair(Cursor::new(Vec::new()));
        reader.close();

        let read = block_on(poll_fn(|cx| reader.poll_read(cx, &mut [0u8; 8])));
        assert!(matches!(read, Err(Error::ChannelClosed)));

        let write = block_on(poll_fn(|cx| writer.poll_write(cx, b"data")));
        assert!(matches!(write, Err(Error::ChannelClosed)));
    }

    #[test]
    fn test_pair_reads_shared_socket() {
        let (mut reader, _writer) = SocketChannel::pair(Cursor::new(b"hello".to_vec()));

        let mut buf = [0u8; 8];
        let n = block_on(poll_fn(|cx| reader.poll_read(cx, &mut buf))).unwrap();
        assert_eq!(&buf[..n], b"hello");

        let n = block_on(poll_fn(|cx| reader.poll_read(cx, &mut buf))).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_shutdown_marks_closed() {
        let mut channel = SocketChannel::solo(Cursor::new(Vec::new()));
        block_on(poll_fn(|cx| channel.poll_shutdown(cx))).unwrap();
        assert!(channel.is_closed());

        // Second shutdown is a no-op.
        block_on(poll_fn(|cx| channel.poll_shutdown(cx))).unwrap();
    }
}
