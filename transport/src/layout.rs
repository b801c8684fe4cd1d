//! Greedy datagram layout for a frame.
//!
//! The sender packs from this plan and the receiver derives a frame's
//! expected chunk count from it, so both ends always agree on how many
//! chunks a frame of a given size produces.

use wire::{WireConfig, DATAGRAM_HEADER_SIZE, MASTER_HEADER_SIZE};

/// Kind of a planned chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Master,
    Slave,
}

/// One chunk in a datagram plan: which payload bytes it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedChunk {
    pub kind: ChunkKind,
    /// Payload offset of the first byte carried.
    pub offset: usize,
    pub len: usize,
}

/// The chunks of one datagram and its total encoded size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatagramPlan {
    /// Datagram size in bytes, header included.
    pub size: usize,
    pub chunks: Vec<PlannedChunk>,
}

/// Iterator over the datagram plans for a frame of a given size.
///
/// Every datagram is filled greedily: the first opens with the master chunk,
/// then slave chunks are appended while there is room for a slave header plus
/// at least one byte. Chunks never exceed `max_chunk_bytes` and datagrams
/// never exceed `max_datagram_bytes`.
///
/// Limits that cannot make progress end the iteration early; validate them
/// with [`Limits::validate`](wire::Limits::validate) first.
#[derive(Debug, Clone)]
pub struct DatagramLayout {
    frame_size: usize,
    planned: usize,
    master_planned: bool,
    max_datagram: usize,
    max_chunk: usize,
    slave_header: usize,
}

impl DatagramLayout {
    #[must_use]
    pub fn new(frame_size: usize, config: &WireConfig) -> Self {
        Self {
            frame_size,
            planned: 0,
            master_planned: false,
            max_datagram: config.limits.max_datagram_bytes,
            max_chunk: config.limits.max_chunk_bytes,
            slave_header: config.dialect.slave_header_size(),
        }
    }

    fn left(&self) -> usize {
        self.frame_size - self.planned
    }
}

impl Iterator for DatagramLayout {
    type Item = DatagramPlan;

    fn next(&mut self) -> Option<DatagramPlan> {
        if self.frame_size == 0 || (self.master_planned && self.left() == 0) {
            return None;
        }

        let mut size = DATAGRAM_HEADER_SIZE;
        let mut chunks = Vec::new();

        if !self.master_planned {
            let take = self
                .left()
                .min(self.max_chunk.saturating_sub(MASTER_HEADER_SIZE))
                .min(
                    self.max_datagram
                        .saturating_sub(DATAGRAM_HEADER_SIZE + MASTER_HEADER_SIZE),
                );
            if take == 0 {
                return None;
            }
            chunks.push(PlannedChunk {
                kind: ChunkKind::Master,
                offset: 0,
                len: take,
            });
            size += MASTER_HEADER_SIZE + take;
            self.planned += take;
            self.master_planned = true;
        }

        while self.left() > 0 && self.max_datagram.saturating_sub(size) > self.slave_header {
            let take = self
                .left()
                .min(self.max_datagram - self.slave_header - size)
                .min(self.max_chunk.saturating_sub(self.slave_header));
            if take == 0 {
                break;
            }
            chunks.push(PlannedChunk {
                kind: ChunkKind::Slave,
                offset: self.planned,
                len: take,
            });
            size += self.slave_header + take;
            self.planned += take;
        }

        if chunks.is_empty() {
            return None;
        }
        Some(DatagramPlan { size, chunks })
    }
}

/// Number of chunks a frame of `frame_size` bytes is split into.
#[must_use]
pub fn chunk_count(frame_size: usize, config: &WireConfig) -> usize {
    DatagramLayout::new(frame_size, config)
        .map(|plan| plan.chunks.len())
        .sum()
}
