//! # XChannel - Completion-to-Stream Socket Bridge
//!
//! XChannel bridges completion-style socket I/O into a backpressure-aware
//! stream model:
//!
//! - **Channel abstraction**: one polymorphic surface over "read into a
//!   buffer" and "write from a buffer" completion operations
//! - **Byte source**: a pull-driven stream of received chunks, one chunk
//!   per completed read
//! - **Byte sink**: a chunk-at-a-time writer with automatic partial-write
//!   retry
//! - **Duplex client**: paired source and sink over one shared socket with
//!   single-winner close ownership
//! - **Server acceptor**: a listener handing out one duplex client per
//!   accepted connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Stream Layer                          │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐   │
//! │  │ ByteSource  │ │  ByteSink   │ │  DuplexClient   │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────┘   │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Channel Layer                         │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐   │
//! │  │ AsyncChannel│ │SocketChannel│ │  Close Guard    │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────┘   │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Socket Layer                          │
//! │  ┌─────────────────────────────────────────────────┐   │
//! │  │      TCP / any futures AsyncRead + AsyncWrite    │   │
//! │  └─────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Bytes pass through uninterpreted: no framing, no multiplexing, no
//! retries beyond completing a partial write. Timeouts are the caller's
//! concern (wrap operations in e.g. `tokio::time::timeout`).
//!
//! ## Example
//!
//! ```rust,ignore
//! use futures::{SinkExt, StreamExt};
//! use xchannel::{connect_duplex, Config};
//!
//! let mut client = connect_duplex("127.0.0.1:9000", &Config::default()).await?;
//!
//! // Send data
//! client.send(b"Hello, World!".to_vec()).await?;
//!
//! // Receive data
//! while let Some(chunk) = client.next().await {
//!     println!("received {} bytes", chunk?.len());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod duplex;
pub mod error;
pub mod net;
pub mod stream;

// Re-export commonly used types
pub use channel::{AsyncChannel, LoopbackChannel, SocketChannel};
pub use config::Config;
pub use duplex::DuplexClient;
pub use error::{Error, Result};
pub use net::{connect_duplex, connect_reader, connect_writer, Incoming, Listener};
pub use stream::{ByteSink, ByteSource};

/// Default read buffer capacity in bytes (one chunk per completed read).
pub const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;
