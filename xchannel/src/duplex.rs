//! Paired reader/writer over one shared socket.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::io::{AsyncRead, AsyncWrite};
use futures::{Sink, Stream};

use crate::channel::SocketChannel;
use crate::config::Config;
use crate::error::Result;
use crate::stream::{ByteSink, ByteSource};

/// A byte source and byte sink paired over one shared socket.
///
/// The reader endpoint owns socket teardown: it is the canonical detector
/// of stream end, so end-of-stream, cancellation, and read errors close the
/// socket. The writer endpoint does not own teardown and cannot close a
/// socket the reader is still draining. The one exception is a fatal write
/// error, which closes the channel directly.
///
/// The composite implements `Stream` and `Sink` itself, or [`split`] hands
/// out the two halves for independent driving.
///
/// [`split`]: DuplexClient::split
#[derive(Debug)]
pub struct DuplexClient<T: AsyncRead + AsyncWrite + Unpin + Send> {
    source: ByteSource<SocketChannel<T>>,
    sink: ByteSink<SocketChannel<T>>,
}

impl<T> DuplexClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Builds a duplex client over one socket.
    pub fn new(io: T, config: &Config) -> Self {
        let (reader, writer) = SocketChannel::pair(io);
        Self {
            source: ByteSource::new(reader, config),
            sink: ByteSink::new(writer),
        }
    }

    /// Splits into the readable and writable halves.
    pub fn split(self) -> (ByteSource<SocketChannel<T>>, ByteSink<SocketChannel<T>>) {
        (self.source, self.sink)
    }
}

impl<T> Stream for DuplexClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Item = Result<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().source).poll_next(cx)
    }
}

impl<T> Sink<Vec<u8>> for DuplexClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Error = crate::error::Error;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        Pin::new(&mut self.get_mut().sink).poll_ready(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: Vec<u8>) -> Result<()> {
        Pin::new(&mut self.get_mut().sink).start_send(item)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        Pin::new(&mut self.get_mut().sink).poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        Pin::new(&mut self.get_mut().sink).poll_close(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use futures::{SinkExt, StreamExt};
    use tokio_util::compat::TokioAsyncReadCompatExt;

    #[tokio::test]
    async fn test_duplex_roundtrip() {
        let (local, remote) = tokio::io::duplex(64);
        let mut client = DuplexClient::new(local.compat(), &Config::default());
        let mut peer = remote.compat();

        client.send(b"ping".to_vec()).await.unwrap();

        use futures::{AsyncReadExt, AsyncWriteExt};
        let mut buf = [0u8; 4];
        peer.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        peer.write_all(b"pong").await.unwrap();
        let chunk = client.next().await.unwrap().unwrap();
        assert_eq!(chunk, b"pong");
    }

    #[tokio::test]
    async fn test_reader_eof_terminates_writes() {
        let (local, remote) = tokio::io::duplex(64);
        let (mut source, mut sink) =
            DuplexClient::new(local.compat(), &Config::default()).split();

        // Peer goes away; the reader observes end-of-stream and closes the
        // shared channel.
        drop(remote);
        assert!(source.next().await.is_none());

        let result = sink.send(b"late".to_vec()).await;
        assert!(matches!(result, Err(Error::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_writer_close_leaves_reader_draining() {
        let (local, remote) = tokio::io::duplex(64);
        let (mut source, mut sink) =
            DuplexClient::new(local.compat(), &Config::default()).split();
        let mut peer = remote.compat();

        use futures::AsyncWriteExt;
        peer.write_all(b"data").await.unwrap();

        // Closing the writer half must not tear down the shared socket.
        sink.close().await.unwrap();

        let chunk = source.next().await.unwrap().unwrap();
        assert_eq!(chunk, b"data");
    }
}
