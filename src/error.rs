//! Error types for the extprot codec.

/// Errors that can occur while encoding or decoding extprot values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stream ended cleanly between values; there is nothing left to read.
    #[error("end of stream")]
    Eof,

    /// The stream ended in the middle of a value.
    #[error("unexpected end of stream inside a value")]
    UnexpectedEof,

    /// The prefix encodes a wire type the descriptor does not accept at this
    /// position, or an unknown union constructor tag.
    #[error("unexpected wire type")]
    UnexpectedWireType,

    /// The bytes were well-formed but semantically invalid.
    #[error("parse error: {0}")]
    Parse(String),

    /// The value does not fit the descriptor it was rendered against.
    #[error("render error: {0}")]
    Render(String),

    /// A default value was requested for a type that has none.
    #[error("no default value defined for this type")]
    UndefinedDefault,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
