//! Error types for byte cursor operations.

use std::fmt;

/// Result type for byte cursor operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading or writing through a byte cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Attempted to write past the writer's capacity bound.
    BufferOverflow {
        /// Total size the write would have produced.
        attempted: usize,
        /// Maximum capacity in bytes.
        capacity: usize,
    },

    /// Seek or patch target lies outside the written region.
    SeekOutOfRange {
        /// Requested position.
        position: usize,
        /// Current length of the buffer.
        len: usize,
    },
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::BufferOverflow {
                attempted,
                capacity,
            } => {
                write!(
                    f,
                    "attempted to write up to {attempted} bytes but buffer capacity is {capacity} bytes"
                )
            }
            Self::SeekOutOfRange { position, len } => {
                write!(f, "position {position} is outside a buffer of {len} bytes")
            }
        }
    }
}

impl std::error::Error for ByteError {}
