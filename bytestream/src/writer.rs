//! Byte-level writer for encoding fixed-width binary data.

use crate::error::{ByteError, ByteResult};
use crate::order::ByteOrder;

/// A byte cursor for encoding fixed-width binary data.
///
/// Writes are accumulated in an internal buffer. A writer created with
/// [`with_limit`](Self::with_limit) refuses any write that would grow the
/// buffer past the limit. Like [`ByteReader`](crate::ByteReader), the first
/// failure is latched until [`reset_status`](Self::reset_status).
///
/// Call [`finish`](Self::finish) to get the final byte buffer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
    pos: usize,
    limit: Option<usize>,
    order: ByteOrder,
    status: Option<ByteError>,
}

impl ByteWriter {
    /// Creates a new empty, unbounded big-endian `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer that can never hold more than `limit` bytes.
    ///
    /// The full limit is allocated up front.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(limit),
            pos: 0,
            limit: Some(limit),
            order: ByteOrder::BigEndian,
            status: None,
        }
    }

    /// Sets the byte order, builder style.
    #[must_use]
    pub fn order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns the byte order used for multi-byte writes.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Changes the byte order used for subsequent writes.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Returns the number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the current write position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the first error latched by this writer, if any.
    pub fn status(&self) -> ByteResult<()> {
        match &self.status {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Clears the latched error.
    pub fn reset_status(&mut self) {
        self.status = None;
    }

    /// Moves the write position within the already written region.
    pub fn seek(&mut self, position: usize) -> ByteResult<()> {
        self.status()?;
        if position > self.bytes.len() {
            return Err(self.latch(ByteError::SeekOutOfRange {
                position,
                len: self.bytes.len(),
            }));
        }
        self.pos = position;
        Ok(())
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, value: u8) -> ByteResult<()> {
        self.write_bytes(&[value])
    }

    /// Writes a `u16` in the configured byte order.
    pub fn write_u16(&mut self, value: u16) -> ByteResult<()> {
        let bytes = self.order.u16_bytes(value);
        self.write_bytes(&bytes)
    }

    /// Writes a `u32` in the configured byte order.
    pub fn write_u32(&mut self, value: u32) -> ByteResult<()> {
        let bytes = self.order.u32_bytes(value);
        self.write_bytes(&bytes)
    }

    /// Writes `bytes` followed by zero padding up to `width` bytes.
    ///
    /// Input longer than `width` is truncated; callers validate lengths first.
    pub fn write_padded(&mut self, bytes: &[u8], width: usize) -> ByteResult<()> {
        let used = bytes.len().min(width);
        self.write_bytes(&bytes[..used])?;
        for _ in used..width {
            self.write_u8(0)?;
        }
        Ok(())
    }

    /// Overwrites a `u16` at `position` without moving the write cursor.
    pub fn patch_u16(&mut self, position: usize, value: u16) -> ByteResult<()> {
        self.status()?;
        let len = self.bytes.len();
        if position.checked_add(2).map_or(true, |end| end > len) {
            return Err(self.latch(ByteError::SeekOutOfRange { position, len }));
        }
        let bytes = self.order.u16_bytes(value);
        self.bytes[position..position + 2].copy_from_slice(&bytes);
        Ok(())
    }

    /// Writes raw bytes at the current position.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> ByteResult<()> {
        self.status()?;
        let end = self.pos + bytes.len();
        if let Some(capacity) = self.limit {
            if end > capacity {
                return Err(self.latch(ByteError::BufferOverflow {
                    attempted: end,
                    capacity,
                }));
            }
        }
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn latch(&mut self, err: ByteError) -> ByteError {
        if self.status.is_none() {
            self.status = Some(err.clone());
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let writer = ByteWriter::new();
        assert!(writer.is_empty());
        assert_eq!(writer.position(), 0);
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn write_big_endian_fields() {
        let mut writer = ByteWriter::new();
        writer.write_u16(0x0100).unwrap();
        writer.write_u32(0xDEAD_BEEF).unwrap();
        writer.write_u8(7).unwrap();
        assert_eq!(
            writer.finish(),
            vec![0x01, 0x00, 0xDE, 0xAD, 0xBE, 0xEF, 0x07]
        );
    }

    #[test]
    fn write_little_endian_fields() {
        let mut writer = ByteWriter::new().order(ByteOrder::LittleEndian);
        writer.write_u16(0x0100).unwrap();
        writer.write_u32(1).unwrap();
        assert_eq!(writer.finish(), vec![0x00, 0x01, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn write_padded_fills_with_nulls() {
        let mut writer = ByteWriter::new();
        writer.write_padded(b"cam1", 6).unwrap();
        assert_eq!(writer.finish(), b"cam1\0\0".to_vec());
    }

    #[test]
    fn write_padded_exact_width() {
        let mut writer = ByteWriter::new();
        writer.write_padded(b"v2sps1", 6).unwrap();
        assert_eq!(writer.finish(), b"v2sps1".to_vec());
    }

    #[test]
    fn bounded_writer_rejects_overflow() {
        let mut writer = ByteWriter::with_limit(3);
        writer.write_u16(1).unwrap();
        let err = writer.write_u16(2).unwrap_err();
        assert_eq!(
            err,
            ByteError::BufferOverflow {
                attempted: 4,
                capacity: 3
            }
        );
        // Latched: even a write that fits now fails.
        assert_eq!(writer.write_u8(0).unwrap_err(), err);
        assert_eq!(writer.len(), 2);
    }

    #[test]
    fn reset_status_clears_latch() {
        let mut writer = ByteWriter::with_limit(1);
        assert!(writer.write_u16(1).is_err());
        writer.reset_status();
        writer.write_u8(9).unwrap();
        assert_eq!(writer.finish(), vec![9]);
    }

    #[test]
    fn patch_u16_back_fills() {
        let mut writer = ByteWriter::new();
        writer.write_u32(0).unwrap();
        writer.write_u8(0xFF).unwrap();
        writer.patch_u16(1, 0xABCD).unwrap();
        assert_eq!(writer.position(), 5);
        assert_eq!(writer.finish(), vec![0x00, 0xAB, 0xCD, 0x00, 0xFF]);
    }

    #[test]
    fn patch_out_of_range_fails() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0).unwrap();
        let err = writer.patch_u16(0, 1).unwrap_err();
        assert!(matches!(err, ByteError::SeekOutOfRange { position: 0, len: 1 }));
    }

    #[test]
    fn seek_then_overwrite() {
        let mut writer = ByteWriter::new();
        writer.write_u32(0x1111_1111).unwrap();
        writer.seek(2).unwrap();
        writer.write_u16(0x2222).unwrap();
        writer.write_u8(0x33).unwrap();
        assert_eq!(writer.finish(), vec![0x11, 0x11, 0x22, 0x22, 0x33]);
    }

    #[test]
    fn seek_past_end_fails() {
        let mut writer = ByteWriter::new();
        assert!(matches!(
            writer.seek(1),
            Err(ByteError::SeekOutOfRange { position: 1, len: 0 })
        ));
    }
}
