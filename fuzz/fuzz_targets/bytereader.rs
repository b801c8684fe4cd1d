#![no_main]

use bytestream::{ByteOrder, ByteReader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let order = match data.first() {
        Some(byte) if byte & 1 == 1 => ByteOrder::LittleEndian,
        _ => ByteOrder::BigEndian,
    };
    let mut reader = ByteReader::with_order(data, order);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 6;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_u16();
            }
            2 => {
                let _ = reader.read_u32();
            }
            3 => {
                let _ = reader.read_array::<6>();
            }
            4 => {
                let len = usize::from(data[idx - 1] >> 2);
                if let Ok(bytes) = reader.read_bytes(len) {
                    assert_eq!(bytes.len(), len);
                }
            }
            _ => {
                let _ = reader.skip(usize::from(data[idx - 1] >> 4));
            }
        }
        assert!(reader.position() <= data.len());
    }
});
