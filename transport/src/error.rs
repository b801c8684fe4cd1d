//! Error types for transport operations.

use std::fmt;

use wire::EncodeError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while packing a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Frame is not transportable.
    Frame(FrameError),

    /// Datagram encoding failed.
    Encode(EncodeError),
}

/// Reasons a frame cannot be transported.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameError {
    EmptyTask,
    EmptyFlow,
    EmptyPayload,

    /// Task identifier is longer than its fixed wire width.
    TaskTooLong { len: usize, limit: usize },

    /// Flow identifier is longer than its fixed wire width.
    FlowTooLong { len: usize, limit: usize },

    /// Identifier contains a NUL byte, which the wire cannot tell from padding.
    NulInIdentifier,

    /// Payload exceeds the maximum frame size.
    PayloadTooLarge { size: usize, limit: usize },
}

/// Reasons an assembler refused a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssemblyError {
    /// The frame is already complete.
    AlreadyComplete,

    /// A master chunk was already accepted for this frame.
    DuplicateMaster,

    /// Arrival-order slave arrived before the master chunk.
    MasterMissing,

    /// Master chunk declares an empty frame.
    ZeroFrameSize,

    /// Chunk carries no data.
    EmptyData,

    /// Offset-addressed slave without an offset.
    MissingOffset,

    /// Offset-addressed slave at offset zero, which belongs to the master.
    ZeroOffset,

    /// Chunk data would end past the frame.
    OutOfBounds { end: usize, limit: usize },

    /// A late master declares fewer chunks than have already arrived.
    ChunkCountMismatch { planned: usize, collected: usize },

    /// The last planned chunk leaves the frame shorter than declared.
    LengthMismatch { received: usize, declared: usize },

    /// Accepting the chunk would grow the buffer past its byte budget.
    BudgetExceeded { needed: usize, budget: usize },

    /// The frame buffer could not be allocated.
    AllocationFailed { size: usize },
}

impl From<FrameError> for TransportError {
    fn from(err: FrameError) -> Self {
        Self::Frame(err)
    }
}

impl From<EncodeError> for TransportError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "frame error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTask => write!(f, "task identifier is empty"),
            Self::EmptyFlow => write!(f, "flow identifier is empty"),
            Self::EmptyPayload => write!(f, "payload is empty"),
            Self::TaskTooLong { len, limit } => {
                write!(f, "task identifier too long: {len} bytes > {limit}")
            }
            Self::FlowTooLong { len, limit } => {
                write!(f, "flow identifier too long: {len} bytes > {limit}")
            }
            Self::NulInIdentifier => write!(f, "identifier contains a NUL byte"),
            Self::PayloadTooLarge { size, limit } => {
                write!(f, "payload too large: {size} bytes > {limit}")
            }
        }
    }
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyComplete => write!(f, "frame already complete"),
            Self::DuplicateMaster => write!(f, "duplicate master chunk"),
            Self::MasterMissing => write!(f, "slave chunk before master chunk"),
            Self::ZeroFrameSize => write!(f, "master chunk declares an empty frame"),
            Self::EmptyData => write!(f, "chunk carries no data"),
            Self::MissingOffset => write!(f, "slave chunk has no offset"),
            Self::ZeroOffset => write!(f, "slave chunk at offset zero"),
            Self::OutOfBounds { end, limit } => {
                write!(f, "chunk data ends at {end}, past {limit}")
            }
            Self::ChunkCountMismatch { planned, collected } => {
                write!(
                    f,
                    "master plans {planned} chunks but {collected} already collected"
                )
            }
            Self::LengthMismatch { received, declared } => {
                write!(f, "frame ends at {received} bytes, declared {declared}")
            }
            Self::BudgetExceeded { needed, budget } => {
                write!(f, "frame buffer needs {needed} bytes, budget is {budget}")
            }
            Self::AllocationFailed { size } => {
                write!(f, "could not allocate a {size}-byte frame buffer")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(e) => Some(e),
            Self::Encode(e) => Some(e),
        }
    }
}

impl std::error::Error for FrameError {}

impl std::error::Error for AssemblyError {}
