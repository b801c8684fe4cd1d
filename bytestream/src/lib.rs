//! Byte-order aware cursor primitives for the chunkwire frame transport.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for fixed-width
//! binary encoding and decoding with a selectable [`ByteOrder`].
//! It is designed for bounded, panic-free operation with explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about frames or chunks.
//! - **Sticky errors** - The first failure is latched and reported by `status()`
//!   until explicitly reset, so a batch of writes can be checked once.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteOrder, ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new().order(ByteOrder::LittleEndian);
//! writer.write_u16(0x0100).unwrap();
//! writer.write_u32(42).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::with_order(&bytes, ByteOrder::LittleEndian);
//! assert_eq!(reader.read_u16().unwrap(), 0x0100);
//! assert_eq!(reader.read_u32().unwrap(), 42);
//! ```

mod error;
mod order;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use order::ByteOrder;
pub use reader::ByteReader;
pub use writer::ByteWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = ByteWriter::new();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = ByteReader::new(&bytes);
        assert!(reader.is_empty());
    }

    #[test]
    fn mixed_roundtrip_both_orders() {
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            let mut writer = ByteWriter::new().order(order);
            writer.write_u8(1).unwrap();
            writer.write_u16(0xBEEF).unwrap();
            writer.write_padded(b"flow", 6).unwrap();
            writer.write_u32(31_850_493).unwrap();
            let bytes = writer.finish();

            let mut reader = ByteReader::with_order(&bytes, order);
            assert_eq!(reader.read_u8().unwrap(), 1);
            assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
            assert_eq!(&reader.read_array::<6>().unwrap(), b"flow\0\0");
            assert_eq!(reader.read_u32().unwrap(), 31_850_493);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn mismatched_order_reads_swapped() {
        let mut writer = ByteWriter::new();
        writer.write_u16(0x0100).unwrap();
        let bytes = writer.finish();

        let mut reader = ByteReader::with_order(&bytes, ByteOrder::LittleEndian);
        assert_eq!(reader.read_u16().unwrap(), 0x0001);
    }
}
