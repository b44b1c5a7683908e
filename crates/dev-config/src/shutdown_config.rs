use crate::{ConfigError, ConfigErrorResult, DEFAULT_SHUTDOWN_GRACE_MS};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long children get to exit after SIGTERM before the launcher returns anyway
    pub grace_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }
}

impl ShutdownConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.grace_ms == 0 {
            return Err(ConfigError::shutdown("shutdown.grace_ms must be > 0"));
        }

        Ok(())
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}
