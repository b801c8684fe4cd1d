//! Per-frame reassembly state.

use wire::{ChunkMeta, Dialect, MasterChunk, SlaveChunk, WireConfig};

use crate::error::AssemblyError;
use crate::frame::Frame;
use crate::layout::chunk_count;

/// Collects the chunks of one frame until it is complete.
///
/// In the arrival-order dialect the master chunk must come first and slaves
/// are appended in the order they arrive. In the offset-addressed dialect
/// chunks may arrive in any order; each slave is written at its offset and
/// the metadata of whichever chunk arrives first is kept.
///
/// Completion is counted, not mapped: the frame completes once as many
/// chunks were accepted as the layout plans for its size.
///
/// The buffer never grows past the assembler's byte budget; a chunk that
/// would need more is refused with [`AssemblyError::BudgetExceeded`] before
/// anything is allocated.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    config: WireConfig,
    meta: Option<ChunkMeta>,
    sequence: u16,
    frame_size: Option<usize>,
    buffer: Vec<u8>,
    collected: usize,
    expected: usize,
    complete: bool,
    budget: usize,
}

impl FrameAssembler {
    #[must_use]
    pub fn new(config: &WireConfig) -> Self {
        Self {
            config: config.clone(),
            meta: None,
            sequence: 0,
            frame_size: None,
            buffer: Vec::new(),
            collected: 0,
            expected: 0,
            complete: false,
            budget: usize::MAX,
        }
    }

    /// Caps the buffer size for subsequent chunks.
    pub fn set_budget(&mut self, bytes: usize) {
        self.budget = bytes;
    }

    /// Bytes currently held by the frame buffer.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.capacity()
    }

    /// Accepts the master chunk of a frame declaring `chunk.frame_size` bytes.
    pub fn put_master(&mut self, chunk: &MasterChunk<'_>) -> Result<(), AssemblyError> {
        if self.complete {
            return Err(AssemblyError::AlreadyComplete);
        }
        if self.frame_size.is_some() {
            return Err(AssemblyError::DuplicateMaster);
        }
        let frame_size = usize::try_from(chunk.frame_size).unwrap_or(usize::MAX);
        if frame_size == 0 {
            return Err(AssemblyError::ZeroFrameSize);
        }
        if chunk.data.is_empty() {
            return Err(AssemblyError::EmptyData);
        }
        if chunk.data.len() > frame_size {
            return Err(AssemblyError::OutOfBounds {
                end: chunk.data.len(),
                limit: frame_size,
            });
        }

        let planned = chunk_count(frame_size, &self.config);
        if self.collected > 0 {
            // Slaves arrived first (offset-addressed only).
            if planned < self.collected + 1 {
                return Err(AssemblyError::ChunkCountMismatch {
                    planned,
                    collected: self.collected,
                });
            }
            if self.buffer.len() > frame_size {
                return Err(AssemblyError::OutOfBounds {
                    end: self.buffer.len(),
                    limit: frame_size,
                });
            }
        } else if self.config.dialect == Dialect::ArrivalOrder
            && planned == 1
            && chunk.data.len() != frame_size
        {
            return Err(AssemblyError::LengthMismatch {
                received: chunk.data.len(),
                declared: frame_size,
            });
        }

        match self.config.dialect {
            Dialect::ArrivalOrder => {
                self.check_budget(frame_size)?;
                self.buffer
                    .try_reserve_exact(frame_size)
                    .map_err(|_| AssemblyError::AllocationFailed { size: frame_size })?;
                self.buffer.extend_from_slice(chunk.data);
            }
            Dialect::OffsetAddressed => {
                self.grow_to(frame_size)?;
                self.buffer[..chunk.data.len()].copy_from_slice(chunk.data);
            }
        }
        if self.meta.is_none() {
            self.meta = Some(chunk.meta);
        }
        self.sequence = chunk.sequence;
        self.frame_size = Some(frame_size);
        self.collected += 1;
        self.expected = planned;
        self.check_complete();
        Ok(())
    }

    /// Accepts a slave chunk.
    pub fn put_slave(&mut self, chunk: &SlaveChunk<'_>) -> Result<(), AssemblyError> {
        if self.complete {
            return Err(AssemblyError::AlreadyComplete);
        }
        match self.config.dialect {
            Dialect::ArrivalOrder => self.append_slave(chunk)?,
            Dialect::OffsetAddressed => self.place_slave(chunk)?,
        }
        self.collected += 1;
        self.check_complete();
        Ok(())
    }

    fn append_slave(&mut self, chunk: &SlaveChunk<'_>) -> Result<(), AssemblyError> {
        let Some(frame_size) = self.frame_size else {
            return Err(AssemblyError::MasterMissing);
        };
        if chunk.data.is_empty() {
            return Err(AssemblyError::EmptyData);
        }
        let end = self.buffer.len() + chunk.data.len();
        if end > frame_size {
            return Err(AssemblyError::OutOfBounds {
                end,
                limit: frame_size,
            });
        }
        // The last planned chunk must fill the frame exactly.
        if self.collected + 1 == self.expected && end != frame_size {
            return Err(AssemblyError::LengthMismatch {
                received: end,
                declared: frame_size,
            });
        }
        self.buffer.extend_from_slice(chunk.data);
        Ok(())
    }

    fn place_slave(&mut self, chunk: &SlaveChunk<'_>) -> Result<(), AssemblyError> {
        let offset = match chunk.offset {
            None => return Err(AssemblyError::MissingOffset),
            Some(0) => return Err(AssemblyError::ZeroOffset),
            Some(offset) => usize::try_from(offset).unwrap_or(usize::MAX),
        };
        if chunk.data.is_empty() {
            return Err(AssemblyError::EmptyData);
        }
        let end = offset.saturating_add(chunk.data.len());
        let limit = self.frame_size.unwrap_or(self.config.limits.max_frame_bytes);
        if end > limit {
            return Err(AssemblyError::OutOfBounds { end, limit });
        }

        if self.meta.is_none() {
            self.meta = Some(chunk.meta);
        }
        self.grow_to(end)?;
        self.buffer[offset..end].copy_from_slice(chunk.data);
        Ok(())
    }

    /// Zero-extends the buffer to at least `len` bytes.
    fn grow_to(&mut self, len: usize) -> Result<(), AssemblyError> {
        if self.buffer.len() < len {
            self.check_budget(len)?;
            self.buffer
                .try_reserve_exact(len - self.buffer.len())
                .map_err(|_| AssemblyError::AllocationFailed { size: len })?;
            self.buffer.resize(len, 0);
        }
        Ok(())
    }

    const fn check_budget(&self, needed: usize) -> Result<(), AssemblyError> {
        if needed > self.budget {
            return Err(AssemblyError::BudgetExceeded {
                needed,
                budget: self.budget,
            });
        }
        Ok(())
    }

    fn check_complete(&mut self) {
        if self.expected != 0 && self.collected == self.expected {
            if let Some(frame_size) = self.frame_size {
                self.buffer.truncate(frame_size);
            }
            self.buffer.shrink_to_fit();
            self.complete = true;
        }
    }

    /// Returns `true` once every planned chunk has been accepted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub const fn collected_count(&self) -> usize {
        self.collected
    }

    /// Planned chunk count; zero until the master chunk arrives.
    #[must_use]
    pub const fn expected_count(&self) -> usize {
        self.expected
    }

    #[must_use]
    pub const fn master_seen(&self) -> bool {
        self.frame_size.is_some()
    }

    /// Returns a copy of the assembled frame if complete.
    #[must_use]
    pub fn frame(&self) -> Option<Frame> {
        if !self.complete {
            return None;
        }
        let meta = self.meta.as_ref()?;
        Some(Frame::from_wire(meta, self.sequence, self.buffer.clone()))
    }

    /// Consumes the assembler, returning the frame if complete.
    #[must_use]
    pub fn into_frame(self) -> Option<Frame> {
        if !self.complete {
            return None;
        }
        let meta = self.meta?;
        Some(Frame::from_wire(&meta, self.sequence, self.buffer))
    }
}
