//! Writes framed values to an async byte stream.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec;
use crate::descriptor::Descriptor;
use crate::error::Error;
use crate::value::Value;
use crate::wire::writer::MemWriter;

/// Writes self-delimited extprot values to an `AsyncWrite` stream.
///
/// Each value is rendered completely into a scratch buffer before any byte
/// goes out, so a render error never leaves a half-written frame behind.
pub struct ValueWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ValueWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encodes and writes one value.
    pub async fn write_value(&mut self, value: &Value, desc: &Descriptor) -> Result<(), Error> {
        let mut scratch = MemWriter::new();
        codec::write_value(&mut scratch, value, desc)?;
        self.writer.write_all(scratch.as_slice()).await?;
        tracing::trace!(len = scratch.len(), "wrote value frame");
        Ok(())
    }

    /// Flushes the underlying stream.
    pub async fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::ValueReader;
    use crate::{from_bytes, Record};
    use std::io::Cursor;

    fn person() -> (Descriptor, Value) {
        let desc = Descriptor::message(
            "person",
            vec![("id", Descriptor::Int), ("name", Descriptor::String)],
        );
        let value = Value::Record(Record::new(
            "person",
            vec![
                ("id".to_owned(), Value::Int(12)),
                ("name".to_owned(), Value::string("ann")),
            ],
        ));
        (desc, value)
    }

    #[tokio::test]
    async fn written_frames_decode_back() {
        let (desc, value) = person();
        let mut out = Vec::new();
        {
            let mut writer = ValueWriter::new(&mut out);
            writer.write_value(&value, &desc).await.unwrap();
            writer.write_value(&value, &desc).await.unwrap();
            writer.flush().await.unwrap();
        }

        let mut reader = ValueReader::new(Cursor::new(out));
        assert_eq!(reader.read_value(&desc).await.unwrap(), value);
        assert_eq!(reader.read_value(&desc).await.unwrap(), value);
        assert!(matches!(reader.read_value(&desc).await, Err(Error::Eof)));
    }

    #[tokio::test]
    async fn frame_matches_in_memory_encoding() {
        let (desc, value) = person();
        let mut out = Vec::new();
        {
            let mut writer = ValueWriter::new(&mut out);
            writer.write_value(&value, &desc).await.unwrap();
        }
        assert_eq!(from_bytes(&out, &desc).unwrap(), value);
        assert_eq!(&out[..], &crate::to_bytes(&value, &desc).unwrap()[..]);
    }

    #[tokio::test]
    async fn render_error_writes_nothing() {
        let (desc, _) = person();
        let mut out = Vec::new();
        {
            let mut writer = ValueWriter::new(&mut out);
            let err = writer.write_value(&Value::Int(1), &desc).await;
            assert!(matches!(err, Err(Error::Render(_))));
        }
        assert!(out.is_empty());
    }
}
