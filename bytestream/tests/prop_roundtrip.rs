use bytestream::{ByteOrder, ByteReader, ByteWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    U16(u16),
    U32(u32),
    Bytes(Vec<u8>),
    Padded(Vec<u8>),
}

const PAD_WIDTH: usize = 6;

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<u16>().prop_map(Op::U16),
        any::<u32>().prop_map(Op::U32),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Op::Bytes),
        prop::collection::vec(any::<u8>(), 0..=PAD_WIDTH).prop_map(Op::Padded),
    ]
}

fn order_strategy() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::BigEndian), Just(ByteOrder::LittleEndian)]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(
        order in order_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..64),
    ) {
        let mut writer = ByteWriter::new().order(order);

        for op in &ops {
            match op {
                Op::U8(v) => writer.write_u8(*v).unwrap(),
                Op::U16(v) => writer.write_u16(*v).unwrap(),
                Op::U32(v) => writer.write_u32(*v).unwrap(),
                Op::Bytes(b) => writer.write_bytes(b).unwrap(),
                Op::Padded(b) => writer.write_padded(b, PAD_WIDTH).unwrap(),
            }
        }

        let bytes = writer.finish();
        let mut reader = ByteReader::with_order(&bytes, order);

        for op in &ops {
            match op {
                Op::U8(v) => prop_assert_eq!(reader.read_u8().unwrap(), *v),
                Op::U16(v) => prop_assert_eq!(reader.read_u16().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(reader.read_u32().unwrap(), *v),
                Op::Bytes(b) => prop_assert_eq!(reader.read_bytes(b.len()).unwrap(), b.as_slice()),
                Op::Padded(b) => {
                    let field = reader.read_array::<PAD_WIDTH>().unwrap();
                    prop_assert_eq!(&field[..b.len()], b.as_slice());
                    prop_assert!(field[b.len()..].iter().all(|&x| x == 0));
                }
            }
        }
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_reader_never_overreads(
        data in prop::collection::vec(any::<u8>(), 0..64),
        reads in prop::collection::vec(0usize..16, 1..32),
    ) {
        let mut reader = ByteReader::new(&data);
        let mut consumed = 0usize;
        for len in reads {
            match reader.read_bytes(len) {
                Ok(slice) => {
                    prop_assert_eq!(slice.len(), len);
                    consumed += len;
                }
                Err(_) => break,
            }
        }
        prop_assert!(consumed <= data.len());
        prop_assert_eq!(reader.position(), consumed);
    }
}
