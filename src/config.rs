//! Configuration for building a history ring.

use std::env;

use thiserror::Error;

use crate::efficient_clock::TickClock;
use crate::history_ring::{HistoRing, InitError};

/// Environment variable overriding [`RingConfig::capacity`].
pub const ENV_CAPACITY: &str = "HISTORING_CAPACITY";
/// Environment variable overriding [`RingConfig::clock`] (`serial` or `cycles`).
pub const ENV_CLOCK: &str = "HISTORING_CLOCK";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Where event timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// No clock: events are numbered 0, 1, 2, ...
    #[default]
    Serial,
    /// CPU counter ticks, see [`TickClock`].
    Cycles,
}

impl ClockSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "serial" | "none" => Some(ClockSource::Serial),
            "cycles" | "tick" | "ticks" => Some(ClockSource::Cycles),
            _ => None,
        }
    }
}

/// Ring configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingConfig {
    /// Number of events retained before the oldest is overwritten
    pub capacity: usize,
    /// Timestamp source
    pub clock: ClockSource,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            clock: ClockSource::Serial,
        }
    }
}

impl RingConfig {
    /// Small ring numbered by serial counter, for memory-starved targets
    pub fn tiny() -> Self {
        Self {
            capacity: 8,
            clock: ClockSource::Serial,
        }
    }

    /// Large ring stamped with CPU ticks, for hosted diagnostics
    pub fn hosted() -> Self {
        Self {
            capacity: 1024,
            clock: ClockSource::Cycles,
        }
    }

    /// Default config with `HISTORING_CAPACITY` and `HISTORING_CLOCK` applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_CAPACITY) {
            self.capacity = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_CAPACITY,
                    value: value.clone(),
                })?;
        }
        if let Some(value) = lookup(ENV_CLOCK) {
            self.clock = ClockSource::parse(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_CLOCK,
                value,
            })?;
        }
        Ok(self)
    }

    /// Builds and initializes a ring.
    pub fn build_ring(&self) -> Result<HistoRing<'static>, InitError> {
        let mut ring = HistoRing::new();
        self.apply(&mut ring)?;
        Ok(ring)
    }

    /// (Re-)initializes `ring` with this config.
    pub fn apply(&self, ring: &mut HistoRing<'_>) -> Result<(), InitError> {
        match self.clock {
            ClockSource::Serial => ring.init(self.capacity, None),
            ClockSource::Cycles => ring.init_with_clock(self.capacity, TickClock::new()),
        }
    }
}
