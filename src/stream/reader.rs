//! Reads framed values from an async byte stream.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec;
use crate::descriptor::Descriptor;
use crate::error::Error;
use crate::value::Value;
use crate::wire::kind;
use crate::wire::reader::SliceReader;

/// Reads self-delimited extprot values from an `AsyncRead` stream.
///
/// Each call buffers exactly one value (prefix, optional length, payload)
/// and decodes it in memory. A stream that ends cleanly between values
/// yields [`Error::Eof`]; one that ends mid-value yields
/// [`Error::UnexpectedEof`].
pub struct ValueReader<R> {
    reader: R,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> ValueReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: BytesMut::new(),
        }
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads and decodes the next value.
    pub async fn read_value(&mut self, desc: &Descriptor) -> Result<Value, Error> {
        self.read_frame().await?;
        tracing::trace!(len = self.buf.len(), "framed value");
        let mut r = SliceReader::new(&self.buf);
        codec::read_value(&mut r, desc)
    }

    /// Advances past the next value without decoding it.
    pub async fn skip_value(&mut self) -> Result<(), Error> {
        self.read_frame().await?;
        tracing::trace!(len = self.buf.len(), "skipped value");
        Ok(())
    }

    /// Buffers one complete value into `self.buf`.
    async fn read_frame(&mut self) -> Result<(), Error> {
        self.buf.clear();

        // The first byte decides between a clean EOF and a truncated value.
        let first = match self.reader.read_u8().await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(Error::Eof),
            Err(e) => return Err(Error::Io(e)),
        };
        self.buf.put_u8(first);
        let prefix = self.finish_varint(first).await?;

        let (wire, _tag) = kind::split_prefix(prefix);
        if kind::is_delimited(wire) {
            let len = self.read_varint().await?;
            return self.read_payload(len).await;
        }
        match wire {
            kind::VINT => self.read_varint().await.map(drop),
            kind::BITS8 => self.read_payload(1).await,
            kind::BITS32 => self.read_payload(4).await,
            kind::BITS64_LONG | kind::BITS64_FLOAT => self.read_payload(8).await,
            kind::ENUM => Ok(()),
            _ => Err(Error::UnexpectedWireType),
        }
    }

    /// Reads a whole varint into the frame buffer.
    async fn read_varint(&mut self) -> Result<u64, Error> {
        let first = self.read_frame_byte().await?;
        self.finish_varint(first).await
    }

    /// Continues a varint whose first byte is already buffered.
    async fn finish_varint(&mut self, first: u8) -> Result<u64, Error> {
        let mut x = u64::from(first & 0x7F);
        if first < 0x80 {
            return Ok(x);
        }
        let mut shift = 7usize;
        loop {
            let b = self.read_frame_byte().await?;
            let low = u64::from(b & 0x7F);
            let shifted = low << (shift & 63);
            if shift >= 64 || shifted >> shift != low {
                return Err(Error::Parse("varint overflows 64 bits".into()));
            }
            x |= shifted;
            if b < 0x80 {
                return Ok(x);
            }
            shift += 7;
        }
    }

    async fn read_frame_byte(&mut self) -> Result<u8, Error> {
        let b = self.reader.read_u8().await.map_err(map_io)?;
        self.buf.put_u8(b);
        Ok(b)
    }

    async fn read_payload(&mut self, len: u64) -> Result<(), Error> {
        let n = usize::try_from(len).map_err(|_| Error::UnexpectedEof)?;
        let start = self.buf.len();
        self.buf.resize(start + n, 0);
        self.reader
            .read_exact(&mut self.buf[start..])
            .await
            .map_err(map_io)?;
        Ok(())
    }
}

fn map_io(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::UnexpectedEof
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_bytes;
    use std::io::Cursor;

    fn int_list() -> Descriptor {
        Descriptor::list(Descriptor::Int)
    }

    fn sample(values: &[i64]) -> Value {
        Value::List(values.iter().map(|&i| Value::Int(i)).collect())
    }

    #[tokio::test]
    async fn reads_concatenated_values() {
        let desc = int_list();
        let a = sample(&[1, 2, 3]);
        let b = sample(&[-1]);
        let mut bytes = to_bytes(&a, &desc).unwrap().to_vec();
        bytes.extend(to_bytes(&b, &desc).unwrap());

        let mut reader = ValueReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_value(&desc).await.unwrap(), a);
        assert_eq!(reader.read_value(&desc).await.unwrap(), b);
        assert!(matches!(
            reader.read_value(&desc).await,
            Err(Error::Eof)
        ));
    }

    #[tokio::test]
    async fn skips_whole_values() {
        let desc = int_list();
        let a = sample(&[9, 9, 9]);
        let b = sample(&[7]);
        let mut bytes = to_bytes(&a, &desc).unwrap().to_vec();
        bytes.extend(to_bytes(&b, &desc).unwrap());

        let mut reader = ValueReader::new(Cursor::new(bytes));
        reader.skip_value().await.unwrap();
        assert_eq!(reader.read_value(&desc).await.unwrap(), b);
    }

    #[tokio::test]
    async fn skips_primitive_frames() {
        let mut bytes = to_bytes(&Value::Int(-300), &Descriptor::Int).unwrap().to_vec();
        bytes.extend(to_bytes(&Value::Float(0.5), &Descriptor::Float).unwrap());

        let mut reader = ValueReader::new(Cursor::new(bytes));
        reader.skip_value().await.unwrap();
        assert_eq!(
            reader.read_value(&Descriptor::Float).await.unwrap(),
            Value::Float(0.5)
        );
    }

    #[tokio::test]
    async fn truncated_frame_is_unexpected_eof() {
        let desc = int_list();
        let bytes = to_bytes(&sample(&[1, 2, 3]), &desc).unwrap();
        let cut = &bytes[..bytes.len() - 1];

        let mut reader = ValueReader::new(Cursor::new(cut.to_vec()));
        assert!(matches!(
            reader.read_value(&desc).await,
            Err(Error::UnexpectedEof)
        ));
    }
}
