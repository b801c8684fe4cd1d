//! Datagram and chunk wire layout for the chunkwire frame transport.
//!
//! This crate handles the binary wire format: the datagram header and its
//! checksum, the master/slave/control chunk layouts, and limit enforcement.
//! It does not know how frames are split or reassembled, only how a single
//! datagram looks on the wire.
//!
//! # Design Principles
//!
//! - **Bounded decoding** - Every declared size is validated before it is trusted.
//! - **Zero-copy decoding** - Chunk data borrow from the received datagram.
//! - **Partial results** - A malformed chunk stops parsing without discarding
//!   the chunks decoded before it.
//!
//! # Layout
//!
//! All multi-byte integers use the configured [`ByteOrder`](bytestream::ByteOrder)
//! (big-endian by default).
//!
//! ```text
//! datagram header (10)  version:u16 size:u16 opaque:u32 checksum:u16
//! master chunk   (29+)  tag:u8=1 size:u16 meta(20) sequence:u16 frame_size:u32 data
//! slave chunk    (25+)  tag:u8=0 size:u16 meta(20) slave_sequence:u16 [offset:u32] data
//! rtl answer/req  (4)   tag:u8=127/128 session:u16 reserved:u8
//! notification    (3)   tag:u8=129 reserved:u16
//! meta                  task:[u8;6] flow:[u8;6] frame_id:u32 class:u8 priority:u8 time:u16
//! ```

mod checksum;
mod chunk;
mod config;
mod datagram;
mod encode;
mod error;
mod header;
mod limits;

pub use checksum::{crc16, crc16_excluding};
pub use chunk::{ChunkMeta, ChunkRecord, MasterChunk, NotificationChunk, RtlChunk, SlaveChunk};
pub use config::{Dialect, WireConfig};
pub use datagram::{decode_datagram, peek_header, Datagram};
pub use encode::{encode_control_datagram, encode_single_chunk_datagram, DatagramWriter};
pub use error::{ChunkError, DecodeError, EncodeError, WireResult};
pub use header::{
    ChunkTag, DatagramHeader, CHECKSUM_RANGE, CHUNK_META_SIZE, DATAGRAM_HEADER_SIZE, FLOW_SIZE,
    MASTER_HEADER_SIZE, MIN_CHUNK_SIZE, NOTIFICATION_CHUNK_SIZE, RTL_CHUNK_SIZE,
    SLAVE_HEADER_SIZE, SLAVE_HEADER_SIZE_WITH_OFFSET, TASK_SIZE, VERSION,
};
pub use limits::Limits;
