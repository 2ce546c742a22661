//! extprot — codec for a compact, self-delimiting, extensible binary
//! serialization format.
//!
//! Every value on the wire starts with a varint prefix carrying a 4-bit wire
//! type and a constructor tag; length-delimited composites embed their byte
//! length, so readers can skip values they do not understand. Together with
//! default-filling of missing trailing fields and primitive-to-composite
//! promotion, that lets readers and writers built from different schema
//! versions interoperate.
//!
//! # Architecture
//!
//! - **`varint`** — unsigned base-128 varints and the zig-zag signed mapping
//! - **`wire`** — wire-type constants, byte-level readers and writers
//! - **`value`** — the dynamically-typed [`Value`] representation
//! - **`descriptor`** — immutable schema nodes ([`Descriptor`]) that direct
//!   codec dispatch and provide defaults
//! - **`codec`** — descriptor-directed decoding and encoding
//! - **`stream`** — async value framing over tokio byte streams (feature
//!   `stream`)
//!
//! # Example
//!
//! ```
//! use extprot::{from_bytes, to_bytes, Descriptor, Value};
//!
//! let desc = Descriptor::message("point", vec![
//!     ("x", Descriptor::Int),
//!     ("y", Descriptor::Int),
//! ]);
//! let value = Value::Record(extprot::Record::new("point", vec![
//!     ("x".to_owned(), Value::Int(3)),
//!     ("y".to_owned(), Value::Int(-4)),
//! ]));
//!
//! let bytes = to_bytes(&value, &desc)?;
//! assert_eq!(from_bytes(&bytes, &desc)?, value);
//! # Ok::<(), extprot::Error>(())
//! ```

pub mod codec;
pub mod descriptor;
pub mod error;
pub mod value;
pub mod varint;
pub mod wire;

#[cfg(feature = "stream")]
pub mod stream;

use bytes::Bytes;

pub use descriptor::Descriptor;
pub use error::Error;
pub use value::{Record, Value, Variant};

use wire::reader::{SliceReader, SourceReader};
use wire::writer::{MemWriter, SinkWriter};

/// Parses one value of the descriptor's type from a byte slice.
///
/// Trailing bytes are left alone: top-level values are self-delimiting and
/// may be concatenated, so callers streaming several values should use
/// [`from_source`] or [`stream::ValueReader`].
pub fn from_bytes(bytes: &[u8], desc: &Descriptor) -> Result<Value, Error> {
    let mut r = SliceReader::new(bytes);
    codec::read_value(&mut r, desc)
}

/// Parses one value of the descriptor's type from a byte source.
///
/// Returns [`Error::Eof`] when the source is cleanly exhausted before the
/// value starts.
pub fn from_source<R: std::io::Read>(source: R, desc: &Descriptor) -> Result<Value, Error> {
    let mut r = SourceReader::new(source);
    codec::read_value(&mut r, desc)
}

/// Renders a value of the descriptor's type to bytes.
pub fn to_bytes(value: &Value, desc: &Descriptor) -> Result<Bytes, Error> {
    let mut w = MemWriter::new();
    codec::write_value(&mut w, value, desc)?;
    Ok(w.freeze())
}

/// Renders a value of the descriptor's type into a byte sink.
///
/// A failed render may leave bytes already written; callers wanting
/// transactional output should go through [`to_bytes`] first.
pub fn to_sink<W: std::io::Write>(sink: W, value: &Value, desc: &Descriptor) -> Result<(), Error> {
    let mut w = SinkWriter::new(sink);
    codec::write_value(&mut w, value, desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_pair() -> (Descriptor, Value) {
        let desc = Descriptor::tuple(vec![Descriptor::Int, Descriptor::Int]);
        let value = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        (desc, value)
    }

    #[test]
    fn bytes_round_trip() {
        let (desc, value) = int_pair();
        let bytes = to_bytes(&value, &desc).unwrap();
        assert_eq!(from_bytes(&bytes, &desc).unwrap(), value);
    }

    #[test]
    fn source_and_sink_round_trip() {
        let (desc, value) = int_pair();
        let mut out = Vec::new();
        to_sink(&mut out, &value, &desc).unwrap();
        assert_eq!(from_source(std::io::Cursor::new(out), &desc).unwrap(), value);
    }

    #[test]
    fn empty_source_reports_eof() {
        let (desc, _) = int_pair();
        assert!(matches!(
            from_source(std::io::Cursor::new(Vec::new()), &desc),
            Err(Error::Eof)
        ));
    }

    #[test]
    fn sink_sees_identical_bytes() {
        let (desc, value) = int_pair();
        let frozen = to_bytes(&value, &desc).unwrap();
        let mut out = Vec::new();
        to_sink(&mut out, &value, &desc).unwrap();
        assert_eq!(&frozen[..], &out[..]);
    }
}
