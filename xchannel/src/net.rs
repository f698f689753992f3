//! TCP connectors and the server acceptor.
//!
//! Sockets enter through `tokio_util::compat` so the channel layer stays on
//! the `futures` I/O traits regardless of where the socket came from.

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use log::{debug, info};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use crate::channel::SocketChannel;
use crate::config::Config;
use crate::duplex::DuplexClient;
use crate::error::{Error, Result};
use crate::stream::{ByteSink, ByteSource};

/// Duplex client over a TCP socket.
pub type TcpDuplex = DuplexClient<Compat<TcpStream>>;

/// Standalone byte source over a TCP socket.
pub type TcpSource = ByteSource<SocketChannel<Compat<TcpStream>>>;

/// Standalone byte sink over a TCP socket.
pub type TcpSink = ByteSink<SocketChannel<Compat<TcpStream>>>;

async fn connect<A: ToSocketAddrs>(addr: A) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr).await.map_err(Error::Connect)?;
    debug!("connected to {:?}", stream.peer_addr().ok());
    Ok(stream)
}

/// Connects a standalone byte source to `addr`.
///
/// The source owns the socket and closes it on termination.
pub async fn connect_reader<A: ToSocketAddrs>(addr: A, config: &Config) -> Result<TcpSource> {
    let stream = connect(addr).await?;
    Ok(ByteSource::new(SocketChannel::solo(stream.compat()), config))
}

/// Connects a standalone byte sink to `addr`.
///
/// The sink owns the socket and shuts it down when closed.
pub async fn connect_writer<A: ToSocketAddrs>(addr: A) -> Result<TcpSink> {
    let stream = connect(addr).await?;
    Ok(ByteSink::new(SocketChannel::solo(stream.compat())))
}

/// Connects a duplex client to `addr`.
pub async fn connect_duplex<A: ToSocketAddrs>(addr: A, config: &Config) -> Result<TcpDuplex> {
    let stream = connect(addr).await?;
    Ok(DuplexClient::new(stream.compat(), config))
}

/// TCP server acceptor.
///
/// Hands out one duplex client per accepted connection. Holds no
/// per-connection state: each connection's lifecycle is independent, and a
/// failed accept does not affect established connections.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    config: Config,
}

impl Listener {
    /// Binds a listening socket on `addr`.
    ///
    /// A bind failure is fatal and reported immediately.
    pub async fn bind<A: ToSocketAddrs>(addr: A, config: Config) -> Result<Self> {
        let inner = TcpListener::bind(addr).await.map_err(Error::Connect)?;
        info!("listening on {:?}", inner.local_addr().ok());
        Ok(Self { inner, config })
    }

    /// Returns the bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.local_addr().map_err(Error::Connect)
    }

    /// Accepts one connection and wraps it in a duplex client.
    pub async fn accept(&self) -> Result<(TcpDuplex, SocketAddr)> {
        let (stream, peer) = self.inner.accept().await.map_err(Error::Connect)?;
        debug!("accepted connection from {}", peer);
        Ok((DuplexClient::new(stream.compat(), &self.config), peer))
    }

    /// Turns the listener into a stream of accepted duplex clients.
    pub fn incoming(self) -> Incoming {
        Incoming { listener: self }
    }
}

/// Stream of accepted connections, one duplex client per item.
#[derive(Debug)]
pub struct Incoming {
    listener: Listener,
}

impl Stream for Incoming {
    type Item = Result<(TcpDuplex, SocketAddr)>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = match std::task::ready!(this.listener.inner.poll_accept(cx)) {
            Ok((stream, peer)) => {
                debug!("accepted connection from {}", peer);
                Ok((DuplexClient::new(stream.compat(), &this.listener.config), peer))
            }
            Err(e) => Err(Error::Connect(e)),
        };
        Poll::Ready(Some(item))
    }
}
