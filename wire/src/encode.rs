//! Datagram encoding.

use bytestream::ByteWriter;

use crate::checksum::crc16_excluding;
use crate::chunk::{ChunkMeta, ChunkRecord, MasterChunk, NotificationChunk, RtlChunk, SlaveChunk};
use crate::config::{Dialect, WireConfig};
use crate::error::EncodeError;
use crate::header::{
    ChunkTag, CHECKSUM_RANGE, DATAGRAM_HEADER_SIZE, FLOW_SIZE, MASTER_HEADER_SIZE,
    NOTIFICATION_CHUNK_SIZE, RTL_CHUNK_SIZE, TASK_SIZE, VERSION,
};

/// Writes one datagram of a fixed, pre-planned size.
///
/// The header is written up front with the final size and a zero checksum;
/// [`finish`](Self::finish) back-patches the checksum once the datagram is full.
#[derive(Debug)]
pub struct DatagramWriter {
    writer: ByteWriter,
    capacity: usize,
    dialect: Dialect,
    max_chunk_bytes: usize,
}

impl DatagramWriter {
    /// Starts a datagram of exactly `capacity` bytes, header included.
    pub fn new(capacity: usize, config: &WireConfig) -> Result<Self, EncodeError> {
        let limit = config.limits.max_datagram_bytes.min(usize::from(u16::MAX));
        let size = u16::try_from(capacity)
            .ok()
            .filter(|_| capacity > DATAGRAM_HEADER_SIZE && capacity <= limit)
            .ok_or(EncodeError::InvalidDatagramSize {
                size: capacity,
                limit,
            })?;

        let mut writer = ByteWriter::with_limit(capacity).order(config.byte_order);
        writer.write_u16(VERSION)?;
        writer.write_u16(size)?;
        writer.write_u32(0)?;
        writer.write_u16(0)?;

        Ok(Self {
            writer,
            capacity,
            dialect: config.dialect,
            max_chunk_bytes: config.limits.max_chunk_bytes,
        })
    }

    /// Bytes left before the datagram reaches its declared size.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.writer.len()
    }

    /// Writes a master chunk.
    pub fn write_master(&mut self, chunk: &MasterChunk<'_>) -> Result<(), EncodeError> {
        let size = self.chunk_size(MASTER_HEADER_SIZE, chunk.data.len())?;
        self.writer.write_u8(ChunkTag::Master.raw())?;
        self.writer.write_u16(size)?;
        self.write_meta(&chunk.meta)?;
        self.writer.write_u16(chunk.sequence)?;
        self.writer.write_u32(chunk.frame_size)?;
        self.writer.write_bytes(chunk.data)?;
        Ok(())
    }

    /// Writes a slave chunk. The offset is required, and written, only in
    /// the offset-addressed dialect.
    pub fn write_slave(&mut self, chunk: &SlaveChunk<'_>) -> Result<(), EncodeError> {
        let offset = match (self.dialect, chunk.offset) {
            (Dialect::OffsetAddressed, None) => return Err(EncodeError::MissingOffset),
            (Dialect::OffsetAddressed, offset) => offset,
            (Dialect::ArrivalOrder, _) => None,
        };
        let size = self.chunk_size(self.dialect.slave_header_size(), chunk.data.len())?;
        self.writer.write_u8(ChunkTag::Slave.raw())?;
        self.writer.write_u16(size)?;
        self.write_meta(&chunk.meta)?;
        self.writer.write_u16(chunk.slave_sequence)?;
        if let Some(offset) = offset {
            self.writer.write_u32(offset)?;
        }
        self.writer.write_bytes(chunk.data)?;
        Ok(())
    }

    /// Writes an RTL answer chunk.
    pub fn write_rtl_answer(&mut self, chunk: &RtlChunk) -> Result<(), EncodeError> {
        self.write_rtl(ChunkTag::RtlAnswer, chunk)
    }

    /// Writes an RTL request chunk.
    pub fn write_rtl_request(&mut self, chunk: &RtlChunk) -> Result<(), EncodeError> {
        self.write_rtl(ChunkTag::RtlRequest, chunk)
    }

    /// Writes a notification chunk.
    pub fn write_notification(&mut self, chunk: &NotificationChunk) -> Result<(), EncodeError> {
        self.writer.write_u8(ChunkTag::Notification.raw())?;
        self.writer.write_u16(chunk.reserved)?;
        Ok(())
    }

    /// Writes any chunk record.
    pub fn write_chunk(&mut self, record: &ChunkRecord<'_>) -> Result<(), EncodeError> {
        match record {
            ChunkRecord::Master(chunk) => self.write_master(chunk),
            ChunkRecord::Slave(chunk) => self.write_slave(chunk),
            ChunkRecord::RtlAnswer(chunk) => self.write_rtl_answer(chunk),
            ChunkRecord::RtlRequest(chunk) => self.write_rtl_request(chunk),
            ChunkRecord::Notification(chunk) => self.write_notification(chunk),
        }
    }

    /// Checks the datagram is full, patches the checksum, and returns the bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, EncodeError> {
        self.writer.status()?;
        if self.writer.len() != self.capacity {
            return Err(EncodeError::Incomplete {
                written: self.writer.len(),
                capacity: self.capacity,
            });
        }
        let checksum = crc16_excluding(self.writer.as_slice(), CHECKSUM_RANGE);
        self.writer.patch_u16(CHECKSUM_RANGE.start, checksum)?;
        Ok(self.writer.finish())
    }

    fn write_rtl(&mut self, tag: ChunkTag, chunk: &RtlChunk) -> Result<(), EncodeError> {
        self.writer.write_u8(tag.raw())?;
        self.writer.write_u16(chunk.session)?;
        self.writer.write_u8(chunk.reserved)?;
        Ok(())
    }

    fn write_meta(&mut self, meta: &ChunkMeta) -> Result<(), EncodeError> {
        self.writer.write_padded(&meta.task, TASK_SIZE)?;
        self.writer.write_padded(&meta.flow, FLOW_SIZE)?;
        self.writer.write_u32(meta.frame_id)?;
        self.writer.write_u8(meta.classification)?;
        self.writer.write_u8(meta.priority)?;
        self.writer.write_u16(meta.timestamp)?;
        Ok(())
    }

    fn chunk_size(&self, header_size: usize, data_len: usize) -> Result<u16, EncodeError> {
        let size = header_size + data_len;
        if size > self.max_chunk_bytes {
            return Err(EncodeError::ChunkTooLarge {
                size,
                limit: self.max_chunk_bytes,
            });
        }
        u16::try_from(size).map_err(|_| EncodeError::ChunkTooLarge {
            size,
            limit: usize::from(u16::MAX),
        })
    }
}

/// Encodes a datagram carrying exactly one chunk.
pub fn encode_single_chunk_datagram(
    record: &ChunkRecord<'_>,
    config: &WireConfig,
) -> Result<Vec<u8>, EncodeError> {
    let capacity = DATAGRAM_HEADER_SIZE + record.encoded_len(config.dialect);
    let mut writer = DatagramWriter::new(capacity, config)?;
    writer.write_chunk(record)?;
    writer.finish()
}

/// Encodes a keep-alive/session control datagram.
///
/// Control chunks always travel alone, so the datagram is exactly the header
/// plus one control chunk.
pub fn encode_control_datagram(
    record: &ChunkRecord<'_>,
    config: &WireConfig,
) -> Result<Vec<u8>, EncodeError> {
    let capacity = match record {
        ChunkRecord::RtlAnswer(_) | ChunkRecord::RtlRequest(_) => RTL_CHUNK_SIZE,
        ChunkRecord::Notification(_) => NOTIFICATION_CHUNK_SIZE,
        ChunkRecord::Master(_) | ChunkRecord::Slave(_) => {
            return Err(EncodeError::InvalidDatagramSize {
                size: DATAGRAM_HEADER_SIZE + record.encoded_len(config.dialect),
                limit: DATAGRAM_HEADER_SIZE + RTL_CHUNK_SIZE,
            })
        }
    };
    let mut writer = DatagramWriter::new(DATAGRAM_HEADER_SIZE + capacity, config)?;
    writer.write_chunk(record)?;
    writer.finish()
}
