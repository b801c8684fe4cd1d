//! Decoded chunk records.
//!
//! Data slices borrow from the datagram they were decoded from.

use crate::config::Dialect;
use crate::header::{
    ChunkTag, FLOW_SIZE, MASTER_HEADER_SIZE, NOTIFICATION_CHUNK_SIZE, RTL_CHUNK_SIZE, TASK_SIZE,
};

/// Routing metadata carried by every master and slave chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkMeta {
    /// Null-padded sender task identifier.
    pub task: [u8; TASK_SIZE],
    /// Null-padded information flow identifier.
    pub flow: [u8; FLOW_SIZE],
    pub frame_id: u32,
    pub classification: u8,
    pub priority: u8,
    pub timestamp: u16,
}

/// First chunk of a frame; carries the total payload size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterChunk<'a> {
    pub meta: ChunkMeta,
    /// Frame sequence number chosen by the sender.
    pub sequence: u16,
    /// Total payload size of the whole frame.
    pub frame_size: u32,
    pub data: &'a [u8],
}

/// Continuation chunk of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaveChunk<'a> {
    pub meta: ChunkMeta,
    /// Running 1-based counter across the frame's slave chunks.
    pub slave_sequence: u16,
    /// Absolute payload offset; present only in the offset-addressed dialect.
    pub offset: Option<u32>,
    pub data: &'a [u8],
}

/// RTL answer/request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtlChunk {
    pub session: u16,
    pub reserved: u8,
}

/// Notification body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationChunk {
    pub reserved: u16,
}

/// A chunk decoded from a datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRecord<'a> {
    Master(MasterChunk<'a>),
    Slave(SlaveChunk<'a>),
    RtlAnswer(RtlChunk),
    RtlRequest(RtlChunk),
    Notification(NotificationChunk),
}

impl ChunkRecord<'_> {
    /// Returns the wire tag for this record.
    #[must_use]
    pub const fn tag(&self) -> ChunkTag {
        match self {
            Self::Master(_) => ChunkTag::Master,
            Self::Slave(_) => ChunkTag::Slave,
            Self::RtlAnswer(_) => ChunkTag::RtlAnswer,
            Self::RtlRequest(_) => ChunkTag::RtlRequest,
            Self::Notification(_) => ChunkTag::Notification,
        }
    }

    /// Returns the frame this chunk belongs to, if it carries frame data.
    #[must_use]
    pub const fn frame_id(&self) -> Option<u32> {
        match self {
            Self::Master(chunk) => Some(chunk.meta.frame_id),
            Self::Slave(chunk) => Some(chunk.meta.frame_id),
            _ => None,
        }
    }

    /// Returns the payload slice carried by this chunk (empty for control chunks).
    #[must_use]
    pub const fn data(&self) -> &[u8] {
        match self {
            Self::Master(chunk) => chunk.data,
            Self::Slave(chunk) => chunk.data,
            _ => &[],
        }
    }

    /// Encoded size of this chunk, header included, under `dialect`.
    #[must_use]
    pub const fn encoded_len(&self, dialect: Dialect) -> usize {
        match self {
            Self::Master(chunk) => MASTER_HEADER_SIZE + chunk.data.len(),
            Self::Slave(chunk) => dialect.slave_header_size() + chunk.data.len(),
            Self::RtlAnswer(_) | Self::RtlRequest(_) => RTL_CHUNK_SIZE,
            Self::Notification(_) => NOTIFICATION_CHUNK_SIZE,
        }
    }
}
