//! Byte-level reader with bounded operations.

use crate::error::{ByteError, ByteResult};
use crate::order::ByteOrder;

/// A byte cursor for decoding fixed-width binary data.
///
/// All read operations are bounds-checked and return errors on failure.
/// The first failure is latched: every later read fails with the same error
/// until [`reset_status`](Self::reset_status) is called. The reader never
/// panics on malformed input.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
    status: Option<ByteError>,
}

impl<'a> ByteReader<'a> {
    /// Creates a new big-endian `ByteReader` over a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self::with_order(data, ByteOrder::BigEndian)
    }

    /// Creates a new `ByteReader` with the given byte order.
    #[must_use]
    pub const fn with_order(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            pos: 0,
            order,
            status: None,
        }
    }

    /// Returns the byte order used for multi-byte reads.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Changes the byte order used for subsequent reads.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the first error latched by this reader, if any.
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

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> ByteResult<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Reads a `u16` in the configured byte order.
    pub fn read_u16(&mut self) -> ByteResult<u16> {
        let bytes = self.read_array::<2>()?;
        Ok(self.order.u16_from(bytes))
    }

    /// Reads a `u32` in the configured byte order.
    pub fn read_u32(&mut self) -> ByteResult<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(self.order.u32_from(bytes))
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Returns a view of the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> ByteResult<&'a [u8]> {
        self.ensure(len)?;
        let start = self.pos;
        self.pos += len;
        Ok(&self.data[start..self.pos])
    }

    /// Advances past `len` bytes without reading them.
    pub fn skip(&mut self, len: usize) -> ByteResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    fn ensure(&mut self, len: usize) -> ByteResult<()> {
        self.status()?;
        let available = self.remaining();
        if len > available {
            let err = ByteError::UnexpectedEof {
                requested: len,
                available,
            };
            self.status = Some(err.clone());
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reader() {
        let reader = ByteReader::new(&[]);
        assert!(reader.is_empty());
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_from_empty_fails() {
        let mut reader = ByteReader::new(&[]);
        let result = reader.read_u8();
        assert!(matches!(result, Err(ByteError::UnexpectedEof { .. })));
    }

    #[test]
    fn read_big_endian_fields() {
        let mut reader = ByteReader::new(&[0x01, 0x00, 0x12, 0x34, 0x56, 0x78, 0xAB]);
        assert_eq!(reader.read_u16().unwrap(), 0x0100);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_little_endian_fields() {
        let mut reader = ByteReader::with_order(&[0x78, 0x56, 0x34, 0x12], ByteOrder::LittleEndian);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn read_bytes_is_a_view() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = ByteReader::new(&data);
        reader.skip(1).unwrap();
        let view = reader.read_bytes(3).unwrap();
        assert_eq!(view, &[2, 3, 4]);
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn first_error_is_sticky() {
        let mut reader = ByteReader::new(&[0xFF, 0xEE]);
        let err = reader.read_u32().unwrap_err();
        assert_eq!(
            err,
            ByteError::UnexpectedEof {
                requested: 4,
                available: 2
            }
        );
        // A read that would fit still fails with the original error.
        assert_eq!(reader.read_u8().unwrap_err(), err);
        assert_eq!(reader.status().unwrap_err(), err);

        reader.reset_status();
        assert!(reader.status().is_ok());
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn failed_read_does_not_advance() {
        let mut reader = ByteReader::new(&[0x01]);
        assert!(reader.read_u16().is_err());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn switch_byte_order_midstream() {
        let mut reader = ByteReader::new(&[0x00, 0x01, 0x00, 0x01]);
        assert_eq!(reader.read_u16().unwrap(), 0x0001);
        reader.set_byte_order(ByteOrder::LittleEndian);
        assert_eq!(reader.byte_order(), ByteOrder::LittleEndian);
        assert_eq!(reader.read_u16().unwrap(), 0x0100);
    }
}
