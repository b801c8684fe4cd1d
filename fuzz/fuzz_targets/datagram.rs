#![no_main]

use libfuzzer_sys::fuzz_target;
use transport::{Dialect, FrameStream, RegistryLimits, StreamConfig, WireConfig, WireLimits};

fn stream(dialect: Dialect) -> FrameStream {
    let wire = WireConfig::new(dialect).with_limits(WireLimits::for_testing());
    FrameStream::new(StreamConfig::new(wire).with_registry(RegistryLimits::for_testing()))
}

fuzz_target!(|data: &[u8]| {
    for dialect in [Dialect::ArrivalOrder, Dialect::OffsetAddressed] {
        let mut receiver = stream(dialect);
        let config = receiver.config().wire.clone();

        // Split the input into several datagrams so chunks from one can meet another.
        let mut idx = 0usize;
        while idx < data.len() && idx < 8192 {
            let len = (data[idx] as usize % 200).saturating_add(1);
            idx += 1;
            let end = (idx + len).min(data.len());
            let datagram = &data[idx..end];
            idx = end;

            if let Ok(decoded) = wire::decode_datagram(datagram, &config) {
                for record in &decoded.chunks {
                    assert!(record.data().len() <= datagram.len());
                }
            }
            let report = receiver.parse_datagram(datagram);
            assert!(report.chunks_accepted <= report.chunks_decoded);
        }

        for frame in receiver.drain_completed_frames() {
            assert!(!frame.payload.is_empty());
            assert!(frame.payload.len() <= config.limits.max_frame_bytes);
        }
        assert!(receiver.drain_completed_frames().is_empty());
    }
});
