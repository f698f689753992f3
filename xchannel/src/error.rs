use std::fmt;
use std::io;

/// Error type for channel, stream, and connector operations.
#[derive(Debug)]
pub enum Error {
    /// Failed to establish or accept a connection.
    ///
    /// Fatal to that connection attempt; never retried by this layer.
    Connect(io::Error),

    /// An in-flight read or write failed.
    ///
    /// Terminates the affected stream and closes the owning side's channel.
    Io(io::Error),

    /// Operation attempted on a channel that has already been closed.
    ChannelClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connect(e) => write!(f, "connection failed: {}", e),
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connect(e) | Error::Io(e) => Some(e),
            Error::ChannelClosed => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Connect(e) | Error::Io(e) => e,
            Error::ChannelClosed => io::Error::new(io::ErrorKind::NotConnected, "channel closed"),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
