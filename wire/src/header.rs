//! Datagram header, chunk tags, and fixed layout sizes.

use std::fmt;
use std::ops::Range;

/// Current datagram protocol version.
pub const VERSION: u16 = 0x0100;

/// Datagram header size in bytes (10 total).
pub const DATAGRAM_HEADER_SIZE: usize = 2 + 2 + 4 + 2;

/// Byte range of the checksum field inside the datagram header.
pub const CHECKSUM_RANGE: Range<usize> = 8..10;

/// Width of the null-padded task identifier.
pub const TASK_SIZE: usize = 6;

/// Width of the null-padded flow identifier.
pub const FLOW_SIZE: usize = 6;

/// Routing metadata shared by master and slave chunks:
/// task, flow, frame id, classification, priority, timestamp.
pub const CHUNK_META_SIZE: usize = TASK_SIZE + FLOW_SIZE + 4 + 1 + 1 + 2;

/// Master chunk header size in bytes (29 total).
pub const MASTER_HEADER_SIZE: usize = 1 + 2 + CHUNK_META_SIZE + 2 + 4;

/// Slave chunk header size without the offset field (25 total).
pub const SLAVE_HEADER_SIZE: usize = 1 + 2 + CHUNK_META_SIZE + 2;

/// Slave chunk header size with the offset field (29 total).
pub const SLAVE_HEADER_SIZE_WITH_OFFSET: usize = SLAVE_HEADER_SIZE + 4;

/// Size of an RTL answer/request chunk: tag, session, reserved.
pub const RTL_CHUNK_SIZE: usize = 1 + 2 + 1;

/// Size of a notification chunk: tag, reserved.
pub const NOTIFICATION_CHUNK_SIZE: usize = 1 + 2;

/// Smallest possible chunk; fewer trailing bytes are ignored.
pub const MIN_CHUNK_SIZE: usize = NOTIFICATION_CHUNK_SIZE;

/// Chunk type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChunkTag {
    Slave = 0,
    Master = 1,
    RtlAnswer = 127,
    RtlRequest = 128,
    Notification = 129,
}

impl ChunkTag {
    /// Parses a chunk tag from a raw byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Slave),
            1 => Some(Self::Master),
            127 => Some(Self::RtlAnswer),
            128 => Some(Self::RtlRequest),
            129 => Some(Self::Notification),
            _ => None,
        }
    }

    /// Returns the raw tag byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Returns `true` for keep-alive/session chunks that carry no frame data.
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(self, Self::RtlAnswer | Self::RtlRequest | Self::Notification)
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Slave => "slave",
            Self::Master => "master",
            Self::RtlAnswer => "rtl answer",
            Self::RtlRequest => "rtl request",
            Self::Notification => "notification",
        };
        write!(f, "{name}")
    }
}

/// Datagram header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatagramHeader {
    /// Protocol version.
    pub version: u16,
    /// Total datagram size in bytes, header included.
    pub size: u16,
    /// Sender-supplied opaque value, unused by the transport.
    pub opaque: u32,
    /// CRC-16 over the datagram minus the checksum field.
    pub checksum: u16,
}
