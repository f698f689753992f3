//! Writable side of a channel.
//!
//! Accepts chunks one at a time and drains each through the channel before
//! asking for the next, retrying partial writes from the unwritten offset.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Sink;
use log::{debug, trace};

use crate::channel::AsyncChannel;
use crate::error::{Error, Result};

/// Writable side of a channel.
///
/// Implements `Sink<Vec<u8>>` holding at most one pending chunk. A chunk is
/// fully drained before the sink becomes ready for the next one, with
/// partial writes re-issued from the unwritten offset; this is the natural
/// backpressure of the write direction.
///
/// Closing the sink drains the pending chunk, then shuts the socket down
/// only when this endpoint owns teardown (a standalone writer does, the
/// writer half of a duplex pair does not). A write error closes the channel
/// regardless of ownership: a broken connection is never left open.
#[derive(Debug)]
pub struct ByteSink<C> {
    channel: C,
    pending: Option<Vec<u8>>,
    written: usize,
    dead: bool,
}

impl<C: AsyncChannel> ByteSink<C> {
    /// Creates a sink writing through the given channel.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            pending: None,
            written: 0,
            dead: false,
        }
    }

    fn fail(&mut self, error: Error) -> Poll<Result<()>> {
        self.dead = true;
        self.channel.close();
        debug!("sink write failed, channel closed: {}", error);
        Poll::Ready(Err(error))
    }

    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if self.dead {
            return Poll::Ready(Err(Error::ChannelClosed));
        }
        loop {
            match self.pending.as_ref() {
                None => return Poll::Ready(Ok(())),
                Some(chunk) if self.written >= chunk.len() => {
                    trace!("sink drained {} byte chunk", chunk.len());
                    self.pending = None;
                    self.written = 0;
                    return Poll::Ready(Ok(()));
                }
                Some(chunk) => {
                    let remaining = &chunk[self.written..];
                    match std::task::ready!(self.channel.poll_write(cx, remaining)) {
                        Ok(0) => {
                            let error = Error::Io(io::Error::new(
                                io::ErrorKind::WriteZero,
                                "channel accepted zero bytes",
                            ));
                            return self.fail(error);
                        }
                        Ok(n) => {
                            trace!("sink wrote {} of {} bytes", n, remaining.len());
                            self.written += n;
                        }
                        Err(e) => return self.fail(e),
                    }
                }
            }
        }
    }
}

impl<C: AsyncChannel> Sink<Vec<u8>> for ByteSink<C> {
    type Error = Error;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.get_mut().poll_drain(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: Vec<u8>) -> Result<()> {
        let this = self.get_mut();
        if this.dead {
            return Err(Error::ChannelClosed);
        }
        debug_assert!(this.pending.is_none(), "start_send before poll_ready");
        this.written = 0;
        this.pending = Some(item);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.get_mut().poll_drain(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        let this = self.get_mut();
        std::task::ready!(this.poll_drain(cx))?;
        if this.channel.close_on_complete() {
            std::task::ready!(this.channel.poll_shutdown(cx))?;
            debug!("sink completed, channel shut down");
        }
        Poll::Ready(Ok(()))
    }
}
