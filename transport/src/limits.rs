//! Receive-side limits and the combined stream configuration.

use std::time::Duration;

use wire::WireConfig;

/// Bounds on the frames a registry keeps in flight.
///
/// Frames lose chunks on lossy links and would otherwise stay in progress
/// forever. Creating an assembler beyond `max_in_flight_frames` evicts the
/// oldest in-progress frame; [`expire`](crate::FrameRegistry::expire) drops
/// frames older than `max_frame_age`.
///
/// `max_buffered_bytes` bounds the memory all held frames may reserve
/// together. A single offset-addressed chunk can ask for a buffer as large
/// as the maximum frame, so the frame count alone does not bound memory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryLimits {
    /// Maximum number of frames being assembled or awaiting drain.
    pub max_in_flight_frames: usize,

    /// Age after which an in-progress frame is expired. `None` never expires.
    pub max_frame_age: Option<Duration>,

    /// Total frame buffer bytes held across all frames.
    pub max_buffered_bytes: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_in_flight_frames: 256,
            max_frame_age: Some(Duration::from_secs(5)),
            max_buffered_bytes: 64 * 1024 * 1024,
        }
    }
}

impl RegistryLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_in_flight_frames: 4,
            max_frame_age: Some(Duration::from_millis(100)),
            max_buffered_bytes: 16 * 1024,
        }
    }

    /// Never evicts or expires anything (use with caution).
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_in_flight_frames: usize::MAX,
            max_frame_age: None,
            max_buffered_bytes: usize::MAX,
        }
    }
}

/// Configuration for a [`FrameStream`](crate::FrameStream).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StreamConfig {
    pub wire: WireConfig,
    pub registry: RegistryLimits,
}

impl StreamConfig {
    /// Creates a configuration with the given wire settings and default
    /// registry limits.
    #[must_use]
    pub fn new(wire: WireConfig) -> Self {
        Self {
            wire,
            registry: RegistryLimits::default(),
        }
    }

    /// Sets the registry limits, builder style.
    #[must_use]
    pub fn with_registry(mut self, registry: RegistryLimits) -> Self {
        self.registry = registry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::Dialect;

    #[test]
    fn default_limits_are_reasonable() {
        let limits = RegistryLimits::default();
        assert!(limits.max_in_flight_frames >= 16);
        assert_eq!(limits.max_frame_age, Some(Duration::from_secs(5)));
        // Room for two maximum-size frames.
        assert!(limits.max_buffered_bytes >= 2 * wire::Limits::default().max_frame_bytes);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = RegistryLimits::for_testing();
        let default_limits = RegistryLimits::default();
        assert!(test_limits.max_in_flight_frames < default_limits.max_in_flight_frames);
        assert!(test_limits.max_frame_age < default_limits.max_frame_age);
        assert!(test_limits.max_buffered_bytes < default_limits.max_buffered_bytes);
    }

    #[test]
    fn unbounded_never_expires() {
        let limits = RegistryLimits::unbounded();
        assert_eq!(limits.max_in_flight_frames, usize::MAX);
        assert!(limits.max_frame_age.is_none());
        assert_eq!(limits.max_buffered_bytes, usize::MAX);
    }

    #[test]
    fn stream_config_builder() {
        let config = StreamConfig::new(WireConfig::new(Dialect::OffsetAddressed))
            .with_registry(RegistryLimits::unbounded());
        assert_eq!(config.wire.dialect, Dialect::OffsetAddressed);
        assert_eq!(config.registry, RegistryLimits::unbounded());
    }
}
