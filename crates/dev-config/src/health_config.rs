use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS, DEFAULT_HEALTH_INTERVAL_MS,
    DEFAULT_HEALTH_TIMEOUT_MS,
};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Overall window for the backend to become healthy
    pub timeout_ms: u64,
    /// Delay between failed attempts
    pub interval_ms: u64,
    /// Upper bound on a single request
    pub attempt_timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_HEALTH_TIMEOUT_MS,
            interval_ms: DEFAULT_HEALTH_INTERVAL_MS,
            attempt_timeout_ms: DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS,
        }
    }
}

impl HealthConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::health("health.timeout_ms must be > 0"));
        }

        if self.interval_ms == 0 {
            return Err(ConfigError::health("health.interval_ms must be > 0"));
        }

        if self.attempt_timeout_ms == 0 {
            return Err(ConfigError::health("health.attempt_timeout_ms must be > 0"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}
