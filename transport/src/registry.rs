//! Frame registry: routes chunks to per-frame assemblers.

use std::collections::HashMap;
use std::time::Instant;

use wire::{ChunkRecord, Dialect, MasterChunk, SlaveChunk, WireConfig};

use crate::assembler::FrameAssembler;
use crate::error::AssemblyError;
use crate::frame::{Frame, FrameId};
use crate::limits::RegistryLimits;

/// What happened to a routed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The frame's assembler accepted the chunk.
    Accepted,
    /// The frame's assembler refused the chunk.
    Rejected(AssemblyError),
    /// No assembler could take the chunk: an arrival-order slave for an
    /// unknown frame, or a new frame while the registry is full of
    /// completed frames awaiting drain.
    Dropped,
    /// Control chunk; carries no frame data.
    Ignored,
}

/// Registry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistryStats {
    pub chunks_accepted: u64,
    pub chunks_rejected: u64,
    pub chunks_dropped: u64,
    pub frames_completed: u64,
    pub frames_drained: u64,
    /// In-progress frames removed to make room for new ones.
    pub frames_evicted: u64,
    /// In-progress frames removed for exceeding their age limit.
    pub frames_expired: u64,
    /// Frames currently held, complete or not.
    pub in_flight: usize,
    /// Frame buffer bytes currently reserved.
    pub buffered_bytes: usize,
}

#[derive(Debug)]
struct Entry {
    assembler: FrameAssembler,
    created_at: Instant,
    /// Creation order; breaks ties between equal instants.
    serial: u64,
}

/// Maps frame ids to their in-progress assemblers.
#[derive(Debug)]
pub struct FrameRegistry {
    config: WireConfig,
    limits: RegistryLimits,
    entries: HashMap<FrameId, Entry>,
    next_serial: u64,
    stats: RegistryStats,
}

impl FrameRegistry {
    #[must_use]
    pub fn new(config: &WireConfig, limits: RegistryLimits) -> Self {
        Self {
            config: config.clone(),
            limits,
            entries: HashMap::new(),
            next_serial: 0,
            stats: RegistryStats::default(),
        }
    }

    /// Routes any decoded chunk.
    pub fn route(&mut self, record: &ChunkRecord<'_>) -> RouteOutcome {
        match record {
            ChunkRecord::Master(chunk) => self.route_master(chunk),
            ChunkRecord::Slave(chunk) => self.route_slave(chunk),
            ChunkRecord::RtlAnswer(_)
            | ChunkRecord::RtlRequest(_)
            | ChunkRecord::Notification(_) => {
                tracing::trace!(tag = %record.tag(), "control chunk ignored");
                RouteOutcome::Ignored
            }
        }
    }

    /// Routes a master chunk, creating the frame's assembler if needed.
    pub fn route_master(&mut self, chunk: &MasterChunk<'_>) -> RouteOutcome {
        let id = FrameId::new(chunk.meta.frame_id);
        self.deliver(id, true, |assembler| assembler.put_master(chunk))
    }

    /// Routes a slave chunk.
    ///
    /// Arrival-order slaves for unknown frames are dropped since their
    /// position cannot be known without the master chunk. Offset-addressed
    /// slaves create the frame's assembler.
    pub fn route_slave(&mut self, chunk: &SlaveChunk<'_>) -> RouteOutcome {
        let id = FrameId::new(chunk.meta.frame_id);
        let may_create = self.config.dialect == Dialect::OffsetAddressed;
        self.deliver(id, may_create, |assembler| assembler.put_slave(chunk))
    }

    fn deliver(
        &mut self,
        id: FrameId,
        may_create: bool,
        mut put: impl FnMut(&mut FrameAssembler) -> Result<(), AssemblyError>,
    ) -> RouteOutcome {
        let result = if let Some(mut entry) = self.entries.remove(&id) {
            let result = self.put_within_budget(&mut entry.assembler, &mut put);
            self.entries.insert(id, entry);
            result
        } else if !may_create {
            return self.drop_chunk(id);
        } else {
            let mut assembler = FrameAssembler::new(&self.config);
            let result = self.put_within_budget(&mut assembler, &mut put);
            // Only frames whose first chunk was accepted take a slot.
            if result.is_ok() {
                if !self.make_room() {
                    return self.drop_chunk(id);
                }
                self.entries.insert(
                    id,
                    Entry {
                        assembler,
                        created_at: Instant::now(),
                        serial: self.next_serial,
                    },
                );
                self.next_serial += 1;
            }
            result
        };

        match result {
            Ok(()) => {
                self.stats.chunks_accepted += 1;
                if self.is_complete(id) {
                    self.stats.frames_completed += 1;
                    tracing::debug!(frame_id = id.raw(), "frame complete");
                }
                RouteOutcome::Accepted
            }
            Err(err) => {
                self.stats.chunks_rejected += 1;
                tracing::trace!(frame_id = id.raw(), error = %err, "chunk rejected");
                RouteOutcome::Rejected(err)
            }
        }
    }

    fn drop_chunk(&mut self, id: FrameId) -> RouteOutcome {
        self.stats.chunks_dropped += 1;
        tracing::trace!(frame_id = id.raw(), "chunk dropped");
        RouteOutcome::Dropped
    }

    /// Runs `put` on an assembler that is not in the table, granting it the
    /// bytes the held frames leave free. An otherwise valid chunk that needs
    /// more evicts in-progress frames and is retried once.
    fn put_within_budget(
        &mut self,
        assembler: &mut FrameAssembler,
        put: &mut impl FnMut(&mut FrameAssembler) -> Result<(), AssemblyError>,
    ) -> Result<(), AssemblyError> {
        let held = assembler.buffered_bytes();
        assembler.set_budget(self.available_bytes().saturating_add(held));
        let result = put(&mut *assembler);
        if let Err(AssemblyError::BudgetExceeded { needed, .. }) = &result {
            if self.free_bytes(needed.saturating_sub(held)) {
                assembler.set_budget(self.available_bytes().saturating_add(held));
                return put(&mut *assembler);
            }
        }
        result
    }

    /// Buffer bytes not yet reserved by held frames.
    fn available_bytes(&self) -> usize {
        self.limits
            .max_buffered_bytes
            .saturating_sub(self.buffered_bytes())
    }

    /// Evicts in-progress frames, oldest first, until `bytes` are available.
    /// Evicts nothing and returns `false` if that cannot succeed.
    fn free_bytes(&mut self, bytes: usize) -> bool {
        let reclaimable: usize = self
            .entries
            .values()
            .filter(|entry| !entry.assembler.is_complete())
            .map(|entry| entry.assembler.buffered_bytes())
            .sum();
        if self.available_bytes().saturating_add(reclaimable) < bytes {
            return false;
        }
        while self.available_bytes() < bytes {
            if !self.evict_oldest() {
                return false;
            }
        }
        true
    }

    /// Frees a slot for a new frame, evicting the oldest in-progress frame
    /// when full. Returns `false` if every held frame is complete.
    fn make_room(&mut self) -> bool {
        if self.entries.len() < self.limits.max_in_flight_frames {
            return true;
        }
        self.evict_oldest() && self.entries.len() < self.limits.max_in_flight_frames
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.assembler.is_complete())
            .min_by_key(|(_, entry)| entry.serial)
            .map(|(id, _)| *id);
        let Some(oldest) = oldest else {
            return false;
        };
        self.entries.remove(&oldest);
        self.stats.frames_evicted += 1;
        tracing::debug!(frame_id = oldest.raw(), "in-progress frame evicted");
        true
    }

    fn is_complete(&self, id: FrameId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.assembler.is_complete())
    }

    /// Removes and returns every completed frame, ordered by frame id.
    pub fn drain_completed(&mut self) -> Vec<Frame> {
        let mut done: Vec<FrameId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.assembler.is_complete())
            .map(|(id, _)| *id)
            .collect();
        done.sort_unstable();

        let frames: Vec<Frame> = done
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .filter_map(|entry| entry.assembler.into_frame())
            .collect();
        self.stats.frames_drained += frames.len() as u64;
        frames
    }

    /// Removes in-progress frames older than the configured age limit.
    ///
    /// Returns the number of frames removed. Completed frames are kept until
    /// drained.
    pub fn expire(&mut self, now: Instant) -> usize {
        let Some(max_age) = self.limits.max_frame_age else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|id, entry| {
            let stale = !entry.assembler.is_complete()
                && now.saturating_duration_since(entry.created_at) >= max_age;
            if stale {
                tracing::debug!(frame_id = id.raw(), "in-progress frame expired");
            }
            !stale
        });
        let expired = before - self.entries.len();
        self.stats.frames_expired += expired as u64;
        expired
    }

    /// Number of frames held, complete or not.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.entries.len()
    }

    /// Frame buffer bytes reserved by held frames.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.entries
            .values()
            .map(|entry| entry.assembler.buffered_bytes())
            .sum()
    }

    #[must_use]
    pub fn contains(&self, id: FrameId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the assembler for `id`, if one is held.
    #[must_use]
    pub fn assembler(&self, id: FrameId) -> Option<&FrameAssembler> {
        self.entries.get(&id).map(|entry| &entry.assembler)
    }

    /// Forgets a frame. Returns `true` if it was held.
    pub fn discard(&mut self, id: FrameId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Forgets every frame. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            in_flight: self.entries.len(),
            buffered_bytes: self.buffered_bytes(),
            ..self.stats
        }
    }

    #[must_use]
    pub const fn limits(&self) -> &RegistryLimits {
        &self.limits
    }
}
