//! Protocol dialect and the combined wire configuration.

use bytestream::ByteOrder;

use crate::header::{SLAVE_HEADER_SIZE, SLAVE_HEADER_SIZE_WITH_OFFSET};
use crate::limits::Limits;

/// How slave chunks locate their data inside the frame payload.
///
/// Both ends of a link must use the same dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Dialect {
    /// Slaves are appended in arrival order; they must arrive in wire order
    /// after the master chunk.
    #[default]
    ArrivalOrder,
    /// Every slave carries its absolute payload offset; arrival order is free.
    OffsetAddressed,
}

impl Dialect {
    /// Slave chunk header size for this dialect.
    #[must_use]
    pub const fn slave_header_size(self) -> usize {
        match self {
            Self::ArrivalOrder => SLAVE_HEADER_SIZE,
            Self::OffsetAddressed => SLAVE_HEADER_SIZE_WITH_OFFSET,
        }
    }

    /// Returns `true` if slave chunks carry an offset field.
    #[must_use]
    pub const fn has_offsets(self) -> bool {
        matches!(self, Self::OffsetAddressed)
    }
}

/// Everything both ends of a link must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WireConfig {
    pub byte_order: ByteOrder,
    pub dialect: Dialect,
    pub limits: Limits,
}

impl WireConfig {
    /// Creates a configuration for `dialect` with default order and limits.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Sets the byte order, builder style.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Sets the limits, builder style.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}
