//! Datagram decoding.

use bytestream::{ByteOrder, ByteReader, ByteResult};

use crate::checksum::crc16_excluding;
use crate::chunk::{ChunkMeta, ChunkRecord, MasterChunk, NotificationChunk, RtlChunk, SlaveChunk};
use crate::config::{Dialect, WireConfig};
use crate::error::{ChunkError, DecodeError, WireResult};
use crate::header::{
    ChunkTag, DatagramHeader, CHECKSUM_RANGE, DATAGRAM_HEADER_SIZE, MASTER_HEADER_SIZE,
    MIN_CHUNK_SIZE, NOTIFICATION_CHUNK_SIZE, RTL_CHUNK_SIZE, VERSION,
};
use crate::limits::Limits;

/// A decoded datagram: header plus the chunks read before any stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram<'a> {
    pub header: DatagramHeader,
    pub chunks: Vec<ChunkRecord<'a>>,
    /// Why chunk parsing ended early, if it did.
    pub stopped: Option<ChunkError>,
}

impl Datagram<'_> {
    /// Returns `true` if every byte after the header was consumed as chunks.
    #[must_use]
    pub const fn is_fully_parsed(&self) -> bool {
        self.stopped.is_none()
    }
}

/// Decodes a datagram into its header and chunk records.
///
/// Header failures reject the whole datagram. A malformed chunk stops
/// parsing; the chunks decoded before it are kept and the reason is recorded
/// in [`Datagram::stopped`]. Fewer than [`MIN_CHUNK_SIZE`] trailing bytes are
/// ignored.
pub fn decode_datagram<'a>(buf: &'a [u8], config: &WireConfig) -> WireResult<Datagram<'a>> {
    if buf.len() <= DATAGRAM_HEADER_SIZE {
        return Err(DecodeError::DatagramTooSmall {
            actual: buf.len(),
            required: DATAGRAM_HEADER_SIZE + 1,
        });
    }
    if buf.len() > config.limits.max_datagram_bytes {
        return Err(DecodeError::DatagramTooLarge {
            actual: buf.len(),
            limit: config.limits.max_datagram_bytes,
        });
    }

    let mut reader = ByteReader::with_order(buf, config.byte_order);
    let header = read_header(&mut reader).map_err(|_| DecodeError::DatagramTooSmall {
        actual: buf.len(),
        required: DATAGRAM_HEADER_SIZE + 1,
    })?;

    if header.version != VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: header.version,
        });
    }
    if usize::from(header.size) != buf.len() {
        return Err(DecodeError::SizeMismatch {
            declared: header.size,
            actual: buf.len(),
        });
    }
    let computed = crc16_excluding(buf, CHECKSUM_RANGE);
    if header.checksum != computed {
        return Err(DecodeError::ChecksumMismatch {
            declared: header.checksum,
            computed,
        });
    }

    let mut chunks = Vec::new();
    let mut stopped = None;
    while reader.remaining() >= MIN_CHUNK_SIZE {
        let available = reader.remaining();
        let Ok(raw) = reader.read_u8() else {
            break;
        };
        match decode_chunk(&mut reader, raw, available, buf.len(), config) {
            Ok(record) => chunks.push(record),
            Err(err) => {
                stopped = Some(err);
                break;
            }
        }
    }

    Ok(Datagram {
        header,
        chunks,
        stopped,
    })
}

/// Reads the datagram header fields in the given byte order.
///
/// Performs no validation; `buf` must hold at least the header.
pub fn peek_header(buf: &[u8], byte_order: ByteOrder) -> ByteResult<DatagramHeader> {
    let mut reader = ByteReader::with_order(buf, byte_order);
    read_header(&mut reader)
}

fn read_header(reader: &mut ByteReader<'_>) -> ByteResult<DatagramHeader> {
    Ok(DatagramHeader {
        version: reader.read_u16()?,
        size: reader.read_u16()?,
        opaque: reader.read_u32()?,
        checksum: reader.read_u16()?,
    })
}

/// Decodes the chunk whose tag byte `raw` was just read.
///
/// `available` counts the remaining bytes including the tag.
fn decode_chunk<'a>(
    reader: &mut ByteReader<'a>,
    raw: u8,
    available: usize,
    datagram_len: usize,
    config: &WireConfig,
) -> Result<ChunkRecord<'a>, ChunkError> {
    let Some(tag) = ChunkTag::from_raw(raw) else {
        return Err(ChunkError::UnknownTag { tag: raw });
    };

    match tag {
        ChunkTag::Master => decode_master(reader, available, &config.limits),
        ChunkTag::Slave => decode_slave(reader, available, config.dialect, &config.limits),
        ChunkTag::RtlAnswer | ChunkTag::RtlRequest => {
            expect_control_length(tag, datagram_len, RTL_CHUNK_SIZE)?;
            let body = read_rtl(reader).map_err(|_| truncated(tag, RTL_CHUNK_SIZE, available))?;
            Ok(if tag == ChunkTag::RtlAnswer {
                ChunkRecord::RtlAnswer(body)
            } else {
                ChunkRecord::RtlRequest(body)
            })
        }
        ChunkTag::Notification => {
            expect_control_length(tag, datagram_len, NOTIFICATION_CHUNK_SIZE)?;
            let reserved = reader
                .read_u16()
                .map_err(|_| truncated(tag, NOTIFICATION_CHUNK_SIZE, available))?;
            Ok(ChunkRecord::Notification(NotificationChunk { reserved }))
        }
    }
}

fn decode_master<'a>(
    reader: &mut ByteReader<'a>,
    available: usize,
    limits: &Limits,
) -> Result<ChunkRecord<'a>, ChunkError> {
    let tag = ChunkTag::Master;
    if available < MASTER_HEADER_SIZE {
        return Err(truncated(tag, MASTER_HEADER_SIZE, available));
    }
    let (size, meta, sequence, frame_size) = read_master_header(reader)
        .map_err(|_| truncated(tag, MASTER_HEADER_SIZE, available))?;

    let data_len = data_len(tag, size, MASTER_HEADER_SIZE, limits)?;
    if usize::try_from(frame_size).map_or(true, |frame| frame > limits.max_frame_bytes) {
        return Err(ChunkError::FrameTooLarge {
            size: frame_size,
            limit: limits.max_frame_bytes,
        });
    }
    let data = reader
        .read_bytes(data_len)
        .map_err(|_| truncated(tag, usize::from(size), available))?;

    Ok(ChunkRecord::Master(MasterChunk {
        meta,
        sequence,
        frame_size,
        data,
    }))
}

fn decode_slave<'a>(
    reader: &mut ByteReader<'a>,
    available: usize,
    dialect: Dialect,
    limits: &Limits,
) -> Result<ChunkRecord<'a>, ChunkError> {
    let tag = ChunkTag::Slave;
    let header_size = dialect.slave_header_size();
    if available < header_size {
        return Err(truncated(tag, header_size, available));
    }
    let (size, meta, slave_sequence, offset) = read_slave_header(reader, dialect)
        .map_err(|_| truncated(tag, header_size, available))?;

    let data_len = data_len(tag, size, header_size, limits)?;
    let data = reader
        .read_bytes(data_len)
        .map_err(|_| truncated(tag, usize::from(size), available))?;

    Ok(ChunkRecord::Slave(SlaveChunk {
        meta,
        slave_sequence,
        offset,
        data,
    }))
}

fn read_master_header(reader: &mut ByteReader<'_>) -> ByteResult<(u16, ChunkMeta, u16, u32)> {
    let size = reader.read_u16()?;
    let meta = read_meta(reader)?;
    let sequence = reader.read_u16()?;
    let frame_size = reader.read_u32()?;
    Ok((size, meta, sequence, frame_size))
}

fn read_slave_header(
    reader: &mut ByteReader<'_>,
    dialect: Dialect,
) -> ByteResult<(u16, ChunkMeta, u16, Option<u32>)> {
    let size = reader.read_u16()?;
    let meta = read_meta(reader)?;
    let slave_sequence = reader.read_u16()?;
    let offset = if dialect.has_offsets() {
        Some(reader.read_u32()?)
    } else {
        None
    };
    Ok((size, meta, slave_sequence, offset))
}

fn read_meta(reader: &mut ByteReader<'_>) -> ByteResult<ChunkMeta> {
    Ok(ChunkMeta {
        task: reader.read_array()?,
        flow: reader.read_array()?,
        frame_id: reader.read_u32()?,
        classification: reader.read_u8()?,
        priority: reader.read_u8()?,
        timestamp: reader.read_u16()?,
    })
}

fn read_rtl(reader: &mut ByteReader<'_>) -> ByteResult<RtlChunk> {
    Ok(RtlChunk {
        session: reader.read_u16()?,
        reserved: reader.read_u8()?,
    })
}

/// Validates a declared chunk size and returns the data length it implies.
fn data_len(
    tag: ChunkTag,
    size: u16,
    header_size: usize,
    limits: &Limits,
) -> Result<usize, ChunkError> {
    let size_usize = usize::from(size);
    if size_usize <= header_size || size_usize > limits.max_chunk_bytes {
        return Err(ChunkError::InvalidChunkSize { tag, size });
    }
    Ok(size_usize - header_size)
}

/// Control chunks travel alone in a datagram of exactly their size.
fn expect_control_length(
    tag: ChunkTag,
    datagram_len: usize,
    chunk_size: usize,
) -> Result<(), ChunkError> {
    let expected = DATAGRAM_HEADER_SIZE + chunk_size;
    if datagram_len != expected {
        return Err(ChunkError::ControlLengthMismatch {
            tag,
            datagram_len,
            expected,
        });
    }
    Ok(())
}

const fn truncated(tag: ChunkTag, needed: usize, available: usize) -> ChunkError {
    ChunkError::Truncated {
        tag,
        needed,
        available,
    }
}
