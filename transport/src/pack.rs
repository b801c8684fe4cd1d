//! Splitting a frame into datagrams.

use wire::{DatagramWriter, MasterChunk, SlaveChunk, WireConfig};

use crate::error::{FrameError, TransportResult};
use crate::frame::Frame;
use crate::layout::{ChunkKind, DatagramLayout};

/// Packs a frame into ready-to-send datagrams.
///
/// Returns an empty list if the frame is not transportable or encoding fails;
/// nothing partial is ever returned. Use [`try_pack_frame`] for the reason.
#[must_use]
pub fn pack_frame(frame: &Frame, config: &WireConfig) -> Vec<Vec<u8>> {
    match try_pack_frame(frame, config) {
        Ok(datagrams) => datagrams,
        Err(err) => {
            tracing::debug!(frame_id = frame.id.raw(), error = %err, "frame not packed");
            Vec::new()
        }
    }
}

/// Packs a frame into datagrams, reporting why it could not be packed.
///
/// The master chunk opens the first datagram. Slave sequence numbers count
/// from 1 across the whole frame.
pub fn try_pack_frame(frame: &Frame, config: &WireConfig) -> TransportResult<Vec<Vec<u8>>> {
    config.limits.validate(config.dialect)?;
    frame.validate(&config.limits)?;

    let payload = frame.payload.as_slice();
    let frame_size = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        limit: config.limits.max_frame_bytes,
    })?;
    let meta = frame.meta();

    let mut datagrams = Vec::new();
    let mut slave_sequence = 0u16;
    for plan in DatagramLayout::new(payload.len(), config) {
        let mut writer = DatagramWriter::new(plan.size, config)?;
        for chunk in &plan.chunks {
            let data = &payload[chunk.offset..chunk.offset + chunk.len];
            match chunk.kind {
                ChunkKind::Master => writer.write_master(&MasterChunk {
                    meta,
                    sequence: frame.sequence,
                    frame_size,
                    data,
                })?,
                ChunkKind::Slave => {
                    slave_sequence = slave_sequence.wrapping_add(1);
                    writer.write_slave(&SlaveChunk {
                        meta,
                        slave_sequence,
                        offset: u32::try_from(chunk.offset).ok(),
                        data,
                    })?;
                }
            }
        }
        datagrams.push(writer.finish()?);
    }

    tracing::trace!(
        frame_id = frame.id.raw(),
        size = payload.len(),
        datagrams = datagrams.len(),
        "frame packed"
    );
    Ok(datagrams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use wire::{decode_datagram, ChunkRecord, Dialect, EncodeError, Limits};

    fn frame(len: usize) -> Frame {
        Frame::new(7, "cam1", "v2sps1", vec![0u8; len])
    }

    #[test]
    fn two_thousand_bytes_make_two_datagrams() {
        for dialect in [Dialect::ArrivalOrder, Dialect::OffsetAddressed] {
            let config = WireConfig::new(dialect);
            let datagrams = pack_frame(&frame(2000), &config);
            assert_eq!(datagrams.len(), 2);
            assert_eq!(datagrams[0].len(), 1500);
        }
    }

    #[test]
    fn master_first_and_slave_sequence_counts_from_one() {
        let config = WireConfig::new(Dialect::OffsetAddressed);
        let datagrams = pack_frame(&frame(5000), &config);
        let mut sequences = Vec::new();
        let mut masters = 0;
        for (index, bytes) in datagrams.iter().enumerate() {
            let datagram = decode_datagram(bytes, &config).unwrap();
            for (position, record) in datagram.chunks.iter().enumerate() {
                match record {
                    ChunkRecord::Master(master) => {
                        assert_eq!((index, position), (0, 0));
                        assert_eq!(master.frame_size, 5000);
                        masters += 1;
                    }
                    ChunkRecord::Slave(slave) => {
                        sequences.push(slave.slave_sequence);
                        assert!(slave.offset.unwrap() > 0);
                    }
                    _ => panic!("unexpected control chunk"),
                }
            }
        }
        assert_eq!(masters, 1);
        let expected: Vec<u16> = (1..=u16::try_from(sequences.len()).unwrap()).collect();
        assert_eq!(sequences, expected);
    }

    #[test]
    fn invalid_frames_pack_to_nothing() {
        let config = WireConfig::default();
        assert!(pack_frame(&Frame::new(1, "", "f", vec![1]), &config).is_empty());
        assert!(pack_frame(&Frame::new(1, "t", "f", Vec::new()), &config).is_empty());
        assert_eq!(
            try_pack_frame(&Frame::new(1, "t", "f", Vec::new()), &config),
            Err(TransportError::Frame(FrameError::EmptyPayload))
        );
    }

    #[test]
    fn invalid_limits_pack_to_nothing() {
        let config = WireConfig::default().with_limits(Limits {
            max_datagram_bytes: 30,
            ..Limits::default()
        });
        assert!(matches!(
            try_pack_frame(&frame(10), &config),
            Err(TransportError::Encode(EncodeError::InvalidLimits { .. }))
        ));
        assert!(pack_frame(&frame(10), &config).is_empty());
    }

    #[test]
    fn datagrams_respect_testing_limits() {
        let config = WireConfig::default().with_limits(Limits::for_testing());
        let datagrams = pack_frame(&frame(4096), &config);
        assert!(!datagrams.is_empty());
        for bytes in &datagrams {
            assert!(bytes.len() <= 128);
            let datagram = decode_datagram(bytes, &config).unwrap();
            assert!(datagram.is_fully_parsed());
        }
    }
}
