//! The value codec: descriptor-directed decoding and encoding.

pub mod decode;
pub mod encode;

pub use decode::{read_value, skip_value};
pub use encode::write_value;
