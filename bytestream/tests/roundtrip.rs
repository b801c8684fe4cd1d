use bytestream::{ByteError, ByteOrder, ByteReader, ByteWriter};

#[test]
fn bounded_writer_roundtrip_fields() {
    let mut writer = ByteWriter::with_limit(8);
    writer.write_u16(0x0100).unwrap();
    writer.write_u16(8).unwrap();
    writer.write_u32(0).unwrap();
    assert!(writer.status().is_ok());
    let bytes = writer.finish();
    assert_eq!(bytes.len(), 8);

    let mut reader = ByteReader::new(&bytes);
    assert_eq!(reader.read_u16().unwrap(), 0x0100);
    assert_eq!(reader.read_u16().unwrap(), 8);
    assert_eq!(reader.read_u32().unwrap(), 0);
}

#[test]
fn header_backpatch_roundtrip() {
    let mut writer = ByteWriter::new().order(ByteOrder::LittleEndian);
    writer.write_u16(0x0100).unwrap();
    writer.write_u16(0).unwrap();
    writer.write_bytes(&[9, 9, 9]).unwrap();
    let len = u16::try_from(writer.len()).unwrap();
    writer.patch_u16(2, len).unwrap();
    let bytes = writer.finish();

    let mut reader = ByteReader::with_order(&bytes, ByteOrder::LittleEndian);
    reader.skip(2).unwrap();
    assert_eq!(reader.read_u16().unwrap(), 7);
    assert_eq!(reader.read_bytes(3).unwrap(), &[9, 9, 9]);
}

#[test]
fn batch_of_writes_checked_once() {
    let mut writer = ByteWriter::with_limit(4);
    let _ = writer.write_u16(1);
    let _ = writer.write_u16(2);
    let _ = writer.write_u16(3);
    assert_eq!(
        writer.status(),
        Err(ByteError::BufferOverflow {
            attempted: 6,
            capacity: 4
        })
    );
}
