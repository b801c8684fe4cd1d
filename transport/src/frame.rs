//! Frames and frame identifiers.

use wire::{ChunkMeta, Limits, FLOW_SIZE, TASK_SIZE};

use crate::error::FrameError;

/// Default frame priority.
pub const DEFAULT_PRIORITY: u8 = 10;

/// A sender-chosen frame identifier.
///
/// All chunks of one frame carry the same id; the receiver groups chunks by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameId(u32);

impl FrameId {
    /// Creates a new frame ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw frame ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for FrameId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<FrameId> for u32 {
    fn from(id: FrameId) -> Self {
        id.0
    }
}

/// One application message carried over the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: FrameId,
    pub sequence: u16,
    pub classification: u8,
    pub timestamp: u16,
    pub priority: u8,
    /// Sender task identifier, at most 6 bytes of UTF-8.
    pub task: String,
    /// Information flow identifier, at most 6 bytes of UTF-8.
    pub flow: String,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame with zero sequence, classification and timestamp and
    /// the default priority.
    #[must_use]
    pub fn new(
        id: u32,
        task: impl Into<String>,
        flow: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: FrameId::new(id),
            sequence: 0,
            classification: 0,
            timestamp: 0,
            priority: DEFAULT_PRIORITY,
            task: task.into(),
            flow: flow.into(),
            payload: payload.into(),
        }
    }

    #[must_use]
    pub const fn with_sequence(mut self, sequence: u16) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub const fn with_classification(mut self, classification: u8) -> Self {
        self.classification = classification;
        self
    }

    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: u16) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Checks that this frame can be transported under `limits`.
    pub fn validate(&self, limits: &Limits) -> Result<(), FrameError> {
        if self.task.is_empty() {
            return Err(FrameError::EmptyTask);
        }
        if self.flow.is_empty() {
            return Err(FrameError::EmptyFlow);
        }
        if self.payload.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        if self.task.len() > TASK_SIZE {
            return Err(FrameError::TaskTooLong {
                len: self.task.len(),
                limit: TASK_SIZE,
            });
        }
        if self.flow.len() > FLOW_SIZE {
            return Err(FrameError::FlowTooLong {
                len: self.flow.len(),
                limit: FLOW_SIZE,
            });
        }
        if self.task.contains('\0') || self.flow.contains('\0') {
            return Err(FrameError::NulInIdentifier);
        }
        let limit = limits
            .max_frame_bytes
            .min(usize::try_from(u32::MAX).unwrap_or(usize::MAX));
        if self.payload.len() > limit {
            return Err(FrameError::PayloadTooLarge {
                size: self.payload.len(),
                limit,
            });
        }
        Ok(())
    }

    /// Wire metadata shared by every chunk of this frame.
    pub(crate) fn meta(&self) -> ChunkMeta {
        ChunkMeta {
            task: pad_identifier(&self.task),
            flow: pad_identifier(&self.flow),
            frame_id: self.id.raw(),
            classification: self.classification,
            priority: self.priority,
            timestamp: self.timestamp,
        }
    }

    /// Rebuilds a frame from received metadata and its assembled payload.
    pub(crate) fn from_wire(meta: &ChunkMeta, sequence: u16, payload: Vec<u8>) -> Self {
        Self {
            id: FrameId::new(meta.frame_id),
            sequence,
            classification: meta.classification,
            timestamp: meta.timestamp,
            priority: meta.priority,
            task: decode_identifier(&meta.task),
            flow: decode_identifier(&meta.flow),
            payload,
        }
    }
}

fn pad_identifier<const N: usize>(value: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let bytes = value.as_bytes();
    let len = bytes.len().min(N);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

/// Decodes a fixed-width wire identifier.
///
/// Drops trailing NUL padding; invalid UTF-8 is replaced rather than rejected.
#[must_use]
pub fn decode_identifier(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(7, "cam1", "v2sps1", vec![0u8; 2000])
    }

    #[test]
    fn frame_id_conversions() {
        let id = FrameId::from(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(u32::from(id), 42);
    }

    #[test]
    fn new_uses_defaults() {
        let frame = frame();
        assert_eq!(frame.id, FrameId::new(7));
        assert_eq!(frame.priority, DEFAULT_PRIORITY);
        assert_eq!(frame.sequence, 0);
    }

    #[test]
    fn builder_setters() {
        let frame = frame()
            .with_sequence(3)
            .with_classification(2)
            .with_timestamp(900)
            .with_priority(1);
        assert_eq!(frame.sequence, 3);
        assert_eq!(frame.classification, 2);
        assert_eq!(frame.timestamp, 900);
        assert_eq!(frame.priority, 1);
    }

    #[test]
    fn validate_accepts_transportable_frame() {
        assert_eq!(frame().validate(&Limits::default()), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_fields() {
        let limits = Limits::default();
        assert_eq!(
            Frame::new(1, "", "f", vec![1]).validate(&limits),
            Err(FrameError::EmptyTask)
        );
        assert_eq!(
            Frame::new(1, "t", "", vec![1]).validate(&limits),
            Err(FrameError::EmptyFlow)
        );
        assert_eq!(
            Frame::new(1, "t", "f", Vec::new()).validate(&limits),
            Err(FrameError::EmptyPayload)
        );
    }

    #[test]
    fn validate_rejects_long_identifiers() {
        let limits = Limits::default();
        assert!(matches!(
            Frame::new(1, "camera1", "f", vec![1]).validate(&limits),
            Err(FrameError::TaskTooLong { len: 7, .. })
        ));
        // Six characters, but more than six bytes.
        assert!(matches!(
            Frame::new(1, "t", "flöwée", vec![1]).validate(&limits),
            Err(FrameError::FlowTooLong { .. })
        ));
    }

    #[test]
    fn validate_rejects_nul_in_identifiers() {
        let limits = Limits::default();
        assert_eq!(
            Frame::new(1, "a\0", "f", vec![1]).validate(&limits),
            Err(FrameError::NulInIdentifier)
        );
        // Indistinguishable from an empty, fully padded flow.
        assert_eq!(
            Frame::new(1, "t", "\0", vec![1]).validate(&limits),
            Err(FrameError::NulInIdentifier)
        );
    }

    #[test]
    fn validate_rejects_oversized_payload() {
        let limits = Limits::for_testing();
        let frame = Frame::new(1, "t", "f", vec![0u8; limits.max_frame_bytes + 1]);
        assert!(matches!(
            frame.validate(&limits),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn meta_pads_identifiers() {
        let meta = frame().meta();
        assert_eq!(&meta.task, b"cam1\0\0");
        assert_eq!(&meta.flow, b"v2sps1");
        assert_eq!(meta.frame_id, 7);
        assert_eq!(meta.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn decode_identifier_trims_padding() {
        assert_eq!(decode_identifier(b"cam1\0\0"), "cam1");
        assert_eq!(decode_identifier(b"v2sps1"), "v2sps1");
        assert_eq!(decode_identifier(b"\0\0\0\0\0\0"), "");
        assert_eq!(decode_identifier(&[b'a', 0xFF, 0, 0, 0, 0]), "a\u{FFFD}");
    }

    #[test]
    fn from_wire_restores_fields() {
        let original = frame().with_sequence(9).with_timestamp(1);
        let rebuilt = Frame::from_wire(&original.meta(), 9, original.payload.clone());
        assert_eq!(rebuilt, original);
    }
}
