//! Configurable limits for bounded encoding and decoding.

use crate::config::Dialect;
use crate::error::EncodeError;
use crate::header::{DATAGRAM_HEADER_SIZE, MASTER_HEADER_SIZE};

/// Wire-level size limits.
///
/// Both ends of a link must agree on these values. Decoding enforces them to
/// bound memory use on untrusted input; encoding uses them to lay out chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum datagram size in bytes, header included.
    pub max_datagram_bytes: usize,

    /// Maximum chunk size in bytes, chunk header included.
    pub max_chunk_bytes: usize,

    /// Maximum frame payload size in bytes.
    pub max_frame_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Fits an Ethernet MTU.
            max_datagram_bytes: 1500,
            max_chunk_bytes: 512,
            max_frame_bytes: 31_850_493,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_datagram_bytes: 128,
            max_chunk_bytes: 64,
            max_frame_bytes: 4096,
        }
    }

    /// Checks that these limits can lay out any frame under `dialect`.
    ///
    /// Every datagram must be able to carry at least one payload byte, and
    /// sizes must fit the 16-bit size fields.
    pub fn validate(&self, dialect: Dialect) -> Result<(), EncodeError> {
        let widest_header = MASTER_HEADER_SIZE.max(dialect.slave_header_size());
        if self.max_chunk_bytes <= widest_header {
            return Err(EncodeError::InvalidLimits {
                reason: "max_chunk_bytes leaves no room for chunk data",
            });
        }
        if self.max_datagram_bytes <= DATAGRAM_HEADER_SIZE + widest_header {
            return Err(EncodeError::InvalidLimits {
                reason: "max_datagram_bytes leaves no room for chunk data",
            });
        }
        if self.max_datagram_bytes > usize::from(u16::MAX) {
            return Err(EncodeError::InvalidLimits {
                reason: "max_datagram_bytes exceeds the 16-bit size field",
            });
        }
        if u32::try_from(self.max_frame_bytes).is_err() {
            return Err(EncodeError::InvalidLimits {
                reason: "max_frame_bytes exceeds the 32-bit frame size field",
            });
        }
        Ok(())
    }
}
