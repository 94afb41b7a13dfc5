use std::time::Duration;

use crate::constants::{DEFAULT_TICK_RATE_MS, DEFAULT_WINDOW_MS};
use crate::error::ConfigError;

/// The only tunables of the engine: the trailing window and the sampler cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    window_ms: u64,
    tick_rate_ms: u64,
}

impl EngineConfig {
    pub fn new(window_ms: u64, tick_rate_ms: u64) -> Result<Self, ConfigError> {
        if window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if tick_rate_ms == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(Self {
            window_ms,
            tick_rate_ms,
        })
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn tick_rate_ms(&self) -> u64 {
        self.tick_rate_ms
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_values() {
        let config = EngineConfig::default();
        assert_eq!(config.window_ms(), 5_000);
        assert_eq!(config.tick_rate_ms(), 1_000);
    }

    #[test]
    fn rejects_zero_values() {
        assert_eq!(EngineConfig::new(0, 1_000), Err(ConfigError::ZeroWindow));
        assert_eq!(EngineConfig::new(5_000, 0), Err(ConfigError::ZeroTickRate));
        assert!(EngineConfig::new(60_000, 1_000).is_ok());
    }
}
