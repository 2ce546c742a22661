//! Async value framing: reading and writing self-delimited extprot values
//! over tokio byte streams.
//!
//! Top-level values carry their own framing (prefix plus, for delimited
//! types, a byte length), so a stream of values is just their concatenation.
//! [`ValueReader`] pulls one whole value off an `AsyncRead` and decodes it in
//! memory; [`ValueWriter`] renders into a scratch buffer and pushes the bytes
//! out. The codec itself stays synchronous.

pub mod reader;
pub mod writer;

pub use reader::ValueReader;
pub use writer::ValueWriter;
