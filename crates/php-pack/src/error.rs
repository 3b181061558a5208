//! Error types for PHP wire-format encoding and decoding.

use thiserror::Error;

/// Errors that can occur while encoding a [`PhpValue`](crate::PhpValue).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhpEncodeError {
    /// The value has no representation on the wire
    /// (see [`PhpValue::Bytes`](crate::PhpValue::Bytes)).
    #[error("attempt to serialize an unsupported type")]
    UnsupportedType,
}

/// Errors that can occur while decoding the wire format.
///
/// Offsets are byte positions into the input. The first error aborts the
/// whole decode; there is no resynchronization and no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhpDecodeError {
    #[error("unexpected end of input at offset {0}")]
    EndOfInput(usize),
    #[error("`{0}` expected after offset {1}")]
    DelimiterNotFound(char, usize),
    #[error("unknown type tag `{0}` at offset {1}")]
    UnknownTag(char, usize),
    #[error("invalid integer literal at offset {0}")]
    InvalidInt(usize),
    #[error("invalid float literal at offset {0}")]
    InvalidFloat(usize),
    #[error("invalid length at offset {0}")]
    InvalidLength(usize),
    #[error("array key is not an integer or string at offset {0}")]
    InvalidKey(usize),
    #[error("invalid UTF-8 at offset {0}")]
    InvalidUtf8(usize),
}
