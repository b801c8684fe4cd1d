//! Caller-facing transport: packing on the send side, parsing and draining
//! on the receive side.

use std::sync::Arc;
use std::time::Instant;

use bytestream::ByteOrder;
use parking_lot::Mutex;
use wire::{decode_datagram, ChunkError, DecodeError, Dialect};

use crate::error::TransportResult;
use crate::frame::Frame;
use crate::limits::StreamConfig;
use crate::pack::{pack_frame, try_pack_frame};
use crate::registry::{FrameRegistry, RegistryStats, RouteOutcome};

/// Summary of one [`FrameStream::parse_datagram`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Why the whole datagram was discarded, if it was.
    pub rejected: Option<DecodeError>,
    /// Why chunk parsing stopped early, if it did.
    pub stopped: Option<ChunkError>,
    pub chunks_decoded: usize,
    pub chunks_accepted: usize,
    pub chunks_rejected: usize,
    pub chunks_dropped: usize,
    /// Frames that became complete while routing this datagram.
    pub frames_completed: usize,
}

impl ParseReport {
    /// Returns `true` if the datagram passed header validation.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.rejected.is_none()
    }
}

/// A transport endpoint: packs outgoing frames and reassembles incoming ones.
///
/// Both ends of a link must use the same dialect, byte order and limits.
#[derive(Debug)]
pub struct FrameStream {
    config: StreamConfig,
    registry: FrameRegistry,
}

impl Default for FrameStream {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}

impl FrameStream {
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        let registry = FrameRegistry::new(&config.wire, config.registry.clone());
        Self { config, registry }
    }

    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.config.wire.byte_order
    }

    /// Changes the byte order for subsequent packing and parsing.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.config.wire.byte_order = order;
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.config.wire.dialect
    }

    #[must_use]
    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Packs a frame; empty if the frame cannot be transported.
    #[must_use]
    pub fn pack_frame(&self, frame: &Frame) -> Vec<Vec<u8>> {
        pack_frame(frame, &self.config.wire)
    }

    /// Packs a frame, reporting why it could not be packed.
    pub fn try_pack_frame(&self, frame: &Frame) -> TransportResult<Vec<Vec<u8>>> {
        try_pack_frame(frame, &self.config.wire)
    }

    /// Decodes a received datagram and routes its chunks.
    ///
    /// Never fails: malformed datagrams are discarded and malformed chunks
    /// end parsing, as described by the returned report.
    pub fn parse_datagram(&mut self, datagram: &[u8]) -> ParseReport {
        let decoded = match decode_datagram(datagram, &self.config.wire) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::trace!(len = datagram.len(), error = %err, "datagram rejected");
                return ParseReport {
                    rejected: Some(err),
                    ..ParseReport::default()
                };
            }
        };

        let completed_before = self.registry.stats().frames_completed;
        let mut report = ParseReport {
            chunks_decoded: decoded.chunks.len(),
            ..ParseReport::default()
        };
        for record in &decoded.chunks {
            match self.registry.route(record) {
                RouteOutcome::Accepted => report.chunks_accepted += 1,
                RouteOutcome::Rejected(_) => report.chunks_rejected += 1,
                RouteOutcome::Dropped => report.chunks_dropped += 1,
                RouteOutcome::Ignored => {}
            }
        }
        let completed = self.registry.stats().frames_completed - completed_before;
        report.frames_completed = usize::try_from(completed).unwrap_or(usize::MAX);

        if let Some(err) = &decoded.stopped {
            tracing::trace!(error = %err, "chunk parsing stopped");
        }
        report.stopped = decoded.stopped;
        report
    }

    /// Removes and returns every completed frame.
    pub fn drain_completed_frames(&mut self) -> Vec<Frame> {
        self.registry.drain_completed()
    }

    /// Drops in-progress frames older than the configured age limit.
    pub fn expire_stale(&mut self) -> usize {
        self.registry.expire(Instant::now())
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.registry.in_flight()
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    #[must_use]
    pub const fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FrameRegistry {
        &mut self.registry
    }
}

/// A [`FrameStream`] shared between threads, e.g. a receive loop and a
/// consumer draining completed frames.
///
/// Every operation takes the lock for its duration.
#[derive(Debug, Clone, Default)]
pub struct SharedFrameStream {
    inner: Arc<Mutex<FrameStream>>,
}

impl SharedFrameStream {
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        Self::from(FrameStream::new(config))
    }

    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.inner.lock().byte_order()
    }

    pub fn set_byte_order(&self, order: ByteOrder) {
        self.inner.lock().set_byte_order(order);
    }

    #[must_use]
    pub fn pack_frame(&self, frame: &Frame) -> Vec<Vec<u8>> {
        self.inner.lock().pack_frame(frame)
    }

    pub fn parse_datagram(&self, datagram: &[u8]) -> ParseReport {
        self.inner.lock().parse_datagram(datagram)
    }

    pub fn drain_completed_frames(&self) -> Vec<Frame> {
        self.inner.lock().drain_completed_frames()
    }

    pub fn expire_stale(&self) -> usize {
        self.inner.lock().expire_stale()
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight()
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        self.inner.lock().stats()
    }

    /// Runs `f` with the stream locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut FrameStream) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<FrameStream> for SharedFrameStream {
    fn from(stream: FrameStream) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stream)),
        }
    }
}
