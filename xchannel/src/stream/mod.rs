//! Byte stream and sink halves built over a channel.
//!
//! This module provides the directional abstractions that bridge channel
//! completions into a pull-based flow: `ByteSource` turns completed reads
//! into a stream of chunks, `ByteSink` turns a sequence of chunks into
//! writes, each direction with at most one operation in flight.

mod sink;
mod source;

pub use sink::ByteSink;
pub use source::ByteSource;
