//! Configuration Module
//!
//! Handles loading the demo driver's settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{KvError, Result};

/// Demo driver configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Seconds between caller-driven expiration sweeps
    pub sweep_interval: u64,
    /// Maximum entries removed per sweep
    pub sweep_batch: usize,
    /// Number of sweep ticks the demo runs before exiting
    pub demo_ticks: u32,
    /// Maximum pairs returned by the demo's range query
    pub range_limit: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL_SECS` - Sweep interval in seconds (default: 1)
    /// - `SWEEP_BATCH` - Max removals per sweep (default: 128)
    /// - `DEMO_TICKS` - Sweep ticks before exit (default: 3)
    /// - `RANGE_LIMIT` - Max pairs in the range query (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            sweep_batch: env_or("SWEEP_BATCH", defaults.sweep_batch),
            demo_ticks: env_or("DEMO_TICKS", defaults.demo_ticks),
            range_limit: env_or("RANGE_LIMIT", defaults.range_limit),
        }
    }

    /// Rejects settings the demo driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval == 0 {
            return Err(KvError::InvalidConfig(
                "SWEEP_INTERVAL_SECS must be positive".to_string(),
            ));
        }
        if self.sweep_batch == 0 {
            return Err(KvError::InvalidConfig(
                "SWEEP_BATCH must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: 1,
            sweep_batch: 128,
            demo_ticks: 3,
            range_limit: 10,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.sweep_interval, 1);
        assert_eq!(config.sweep_batch, 128);
        assert_eq!(config.demo_ticks, 3);
        assert_eq!(config.range_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SWEEP_INTERVAL_SECS");
        env::remove_var("SWEEP_BATCH");
        env::remove_var("DEMO_TICKS");
        env::remove_var("RANGE_LIMIT");

        let config = Config::from_env();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_or_ignores_unparsable_value() {
        env::set_var("TTL_KV_TEST_UNPARSABLE", "not-a-number");
        assert_eq!(env_or("TTL_KV_TEST_UNPARSABLE", 7u32), 7);
        env::remove_var("TTL_KV_TEST_UNPARSABLE");
    }

    #[test]
    fn test_config_validate_rejects_zero_interval() {
        let config = Config {
            sweep_interval: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(KvError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_validate_rejects_zero_batch() {
        let config = Config {
            sweep_batch: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(KvError::InvalidConfig(_))));
    }
}
