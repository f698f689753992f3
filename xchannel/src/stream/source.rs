//! Readable side of a channel.
//!
//! Repeatedly issues reads against the channel and emits one chunk per
//! completed read, stopping on end-of-stream or cancellation.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use log::{debug, trace};

use crate::channel::AsyncChannel;
use crate::config::Config;
use crate::error::Result;

/// Readable side of a channel.
///
/// Implements `Stream<Item = Result<Vec<u8>>>`: each poll issues at most
/// one read into a reused buffer and yields the filled region as an owned
/// chunk. Because the stream is pull-driven, no read is issued until the
/// consumer asks for the next chunk, which keeps exactly one operation in
/// flight and one unconsumed chunk outstanding at any time.
///
/// Termination closes the channel when this endpoint owns teardown:
/// end-of-stream and read errors do so before the terminal signal is
/// delivered, and cancellation (an explicit [`ByteSource::cancel`] or
/// dropping the source) does so without issuing further reads.
#[derive(Debug)]
pub struct ByteSource<C: AsyncChannel> {
    channel: C,
    buf: Box<[u8]>,
    done: bool,
}

impl<C: AsyncChannel> ByteSource<C> {
    /// Creates a source reading chunks of up to `config.buffer_size` bytes.
    pub fn new(channel: C, config: &Config) -> Self {
        Self {
            channel,
            buf: vec![0u8; config.buffer_size].into_boxed_slice(),
            done: false,
        }
    }

    /// Stops the stream without consuming the remaining bytes.
    ///
    /// Closes the channel if this endpoint owns teardown; no further reads
    /// are issued. A clean stop, not an error.
    pub fn cancel(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        if self.channel.close_on_complete() {
            self.channel.close();
            debug!("source cancelled, channel closed");
        }
    }

    fn terminate(&mut self) {
        self.done = true;
        if self.channel.close_on_complete() {
            self.channel.close();
        }
    }
}

impl<C: AsyncChannel> Stream for ByteSource<C> {
    type Item = Result<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        match std::task::ready!(this.channel.poll_read(cx, &mut this.buf)) {
            Ok(0) => {
                debug!("source reached end-of-stream");
                this.terminate();
                Poll::Ready(None)
            }
            Ok(n) => {
                trace!("source emitting {} byte chunk", n);
                Poll::Ready(Some(Ok(this.buf[..n].to_vec())))
            }
            Err(e) => {
                debug!("source read failed: {}", e);
                this.terminate();
                Poll::Ready(Some(Err(e)))
            }
        }
    }
}

impl<C: AsyncChannel> Drop for ByteSource<C> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::LoopbackChannel;
    use crate::error::Error;
    use futures::executor::block_on;
    use futures::StreamExt;
    use std::io;

    fn small_config(buffer_size: usize) -> Config {
        Config::new().with_buffer_size(buffer_size)
    }

    #[test]
    fn test_source_chunks_and_completes() {
        let channel = LoopbackChannel::new().with_incoming(b"ABCDEFGHIJ");
        let state = channel.state();
        let mut source = ByteSource::new(channel, &small_config(4));

        block_on(async {
            assert_eq!(source.next().await.unwrap().unwrap(), b"ABCD");
            assert_eq!(source.next().await.unwrap().unwrap(), b"EFGH");
            assert_eq!(source.next().await.unwrap().unwrap(), b"IJ");
            assert!(source.next().await.is_none());
            // Terminal signal is delivered exactly once.
            assert!(source.next().await.is_none());
        });
        assert!(state.is_closed());
    }

    #[test]
    fn test_source_concatenation_preserves_bytes() {
        let payload: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
        let channel = LoopbackChannel::new().with_incoming(&payload);
        let mut source = ByteSource::new(channel, &small_config(64));

        let collected = block_on(async {
            let mut out = Vec::new();
            while let Some(chunk) = source.next().await {
                out.extend_from_slice(&chunk.unwrap());
            }
            out
        });
        assert_eq!(collected, payload);
    }

    #[test]
    fn test_source_error_is_terminal() {
        let channel = LoopbackChannel::new()
            .with_incoming(b"AB")
            .with_read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        let state = channel.state();
        let mut source = ByteSource::new(channel, &small_config(4));

        block_on(async {
            assert_eq!(source.next().await.unwrap().unwrap(), b"AB");
            assert!(matches!(source.next().await, Some(Err(Error::Io(_)))));
            assert!(source.next().await.is_none());
        });
        assert!(state.is_closed());
    }

    #[test]
    fn test_cancel_closes_before_next_read() {
        let channel = LoopbackChannel::new().with_incoming(b"ABCD");
        let state = channel.state();
        let mut source = ByteSource::new(channel, &small_config(4));

        source.cancel();
        assert!(state.is_closed());
        assert_eq!(state.reads_issued(), 0);
        assert!(block_on(source.next()).is_none());
        assert_eq!(state.reads_issued(), 0);
    }

    #[test]
    fn test_drop_closes_owning_channel() {
        let channel = LoopbackChannel::new().with_incoming(b"ABCD");
        let state = channel.state();
        let source = ByteSource::new(channel, &small_config(4));

        drop(source);
        assert!(state.is_closed());
    }

    #[test]
    fn test_single_read_in_flight() {
        let channel = LoopbackChannel::new().with_incoming(b"ABCDEFGH");
        let state = channel.state();
        let mut source = ByteSource::new(channel, &small_config(4));

        block_on(async {
            source.next().await;
            assert_eq!(state.reads_issued(), 1);
            source.next().await;
            assert_eq!(state.reads_issued(), 2);
        });
    }
}
