//! Byte-level write streams for the encoder.
//!
//! [`MemWriter`] owns a growable [`BytesMut`] buffer; the encoder also uses
//! it as the scratch stream when rendering length-prefixed payloads.
//! [`SinkWriter`] passes bytes through to a caller-provided [`std::io::Write`].

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Error;

/// Abstract byte sink the encoder pushes to. Writers never truncate.
pub trait WriteBytes {
    /// Appends a single byte.
    fn write_byte(&mut self, b: u8) -> Result<(), Error>;

    /// Appends all of `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

/// Growable in-memory byte sink.
#[derive(Debug, Default)]
pub struct MemWriter {
    buf: BytesMut,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer and freezes its buffer.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

impl WriteBytes for MemWriter {
    fn write_byte(&mut self, b: u8) -> Result<(), Error> {
        self.buf.put_u8(b);
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.buf.put_slice(bytes);
        Ok(())
    }
}

/// Pass-through sink over a caller-provided writer.
#[derive(Debug)]
pub struct SinkWriter<W> {
    sink: W,
}

impl<W: Write> SinkWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Returns the wrapped sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> WriteBytes for SinkWriter<W> {
    fn write_byte(&mut self, b: u8) -> Result<(), Error> {
        self.write_all(&[b])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.sink.write_all(bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_writer_accumulates() {
        let mut w = MemWriter::new();
        w.write_byte(0x01).unwrap();
        w.write_all(&[0x02, 0x03]).unwrap();
        assert_eq!(w.as_slice(), &[0x01, 0x02, 0x03]);
        assert_eq!(w.len(), 3);
        assert_eq!(&w.freeze()[..], &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn sink_writer_passes_through() {
        let mut out = Vec::new();
        {
            let mut w = SinkWriter::new(&mut out);
            w.write_all(&[0xDE, 0xAD]).unwrap();
            w.write_byte(0xBE).unwrap();
        }
        assert_eq!(out, vec![0xDE, 0xAD, 0xBE]);
    }
}
