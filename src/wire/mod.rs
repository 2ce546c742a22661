//! Wire-level building blocks: type constants, byte readers, byte writers.

pub mod kind;
pub mod reader;
pub mod writer;

pub use reader::{ReadBytes, SliceReader, SourceReader};
pub use writer::{MemWriter, SinkWriter, WriteBytes};
