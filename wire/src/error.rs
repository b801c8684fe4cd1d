//! Error types for wire format operations.

use std::fmt;

use bytestream::ByteError;

use crate::header::ChunkTag;

/// Result type for datagram decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Reasons a whole datagram is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Datagram is not longer than the fixed header.
    DatagramTooSmall { actual: usize, required: usize },

    /// Datagram exceeds the configured maximum.
    DatagramTooLarge { actual: usize, limit: usize },

    /// Unsupported protocol version.
    UnsupportedVersion { found: u16 },

    /// Size field disagrees with the received length.
    SizeMismatch { declared: u16, actual: usize },

    /// Checksum field disagrees with the recomputed checksum.
    ChecksumMismatch { declared: u16, computed: u16 },
}

/// Reasons chunk parsing stopped partway through a valid datagram.
///
/// Chunks decoded before the stop are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChunkError {
    /// Fewer bytes remain than the chunk needs.
    Truncated {
        tag: ChunkTag,
        needed: usize,
        available: usize,
    },

    /// Declared chunk size is not above the header size or exceeds the limit.
    InvalidChunkSize { tag: ChunkTag, size: u16 },

    /// Master chunk declares a frame larger than the limit.
    FrameTooLarge { size: u32, limit: usize },

    /// Control chunk in a datagram of the wrong length.
    ControlLengthMismatch {
        tag: ChunkTag,
        datagram_len: usize,
        expected: usize,
    },

    /// Unknown chunk tag; the rest of the datagram is untrustworthy.
    UnknownTag { tag: u8 },
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// Limits cannot lay out frames.
    InvalidLimits { reason: &'static str },

    /// Datagram capacity outside `(header, max_datagram_bytes]`.
    InvalidDatagramSize { size: usize, limit: usize },

    /// Chunk would exceed the chunk size limit.
    ChunkTooLarge { size: usize, limit: usize },

    /// Offset-addressed slave chunk written without an offset.
    MissingOffset,

    /// Datagram finished before reaching its declared size.
    Incomplete { written: usize, capacity: usize },

    /// Underlying byte cursor failure.
    Stream(ByteError),
}

impl From<ByteError> for EncodeError {
    fn from(err: ByteError) -> Self {
        Self::Stream(err)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatagramTooSmall { actual, required } => {
                write!(
                    f,
                    "datagram too small: {actual} bytes, need at least {required}"
                )
            }
            Self::DatagramTooLarge { actual, limit } => {
                write!(f, "datagram too large: {actual} bytes, limit {limit}")
            }
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported protocol version: 0x{found:04X}")
            }
            Self::SizeMismatch { declared, actual } => {
                write!(
                    f,
                    "size mismatch: header declares {declared} bytes but {actual} received"
                )
            }
            Self::ChecksumMismatch { declared, computed } => {
                write!(
                    f,
                    "checksum mismatch: declared 0x{declared:04X}, computed 0x{computed:04X}"
                )
            }
        }
    }
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                tag,
                needed,
                available,
            } => {
                write!(
                    f,
                    "truncated {tag} chunk: need {needed} bytes, have {available}"
                )
            }
            Self::InvalidChunkSize { tag, size } => {
                write!(f, "invalid {tag} chunk size: {size}")
            }
            Self::FrameTooLarge { size, limit } => {
                write!(f, "frame too large: {size} > {limit}")
            }
            Self::ControlLengthMismatch {
                tag,
                datagram_len,
                expected,
            } => {
                write!(
                    f,
                    "{tag} chunk in a {datagram_len}-byte datagram, expected {expected}"
                )
            }
            Self::UnknownTag { tag } => write!(f, "unknown chunk tag: {tag}"),
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLimits { reason } => write!(f, "invalid limits: {reason}"),
            Self::InvalidDatagramSize { size, limit } => {
                write!(f, "invalid datagram size {size}, limit {limit}")
            }
            Self::ChunkTooLarge { size, limit } => {
                write!(f, "chunk too large: {size} > {limit}")
            }
            Self::MissingOffset => write!(f, "slave chunk requires an offset"),
            Self::Incomplete { written, capacity } => {
                write!(f, "datagram incomplete: wrote {written} of {capacity} bytes")
            }
            Self::Stream(err) => write!(f, "byte stream error: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl std::error::Error for ChunkError {}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(err) => Some(err),
            _ => None,
        }
    }
}
