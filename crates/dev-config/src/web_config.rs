use crate::{ConfigError, ConfigErrorResult, DEFAULT_WEB_COMMAND, DEFAULT_WEB_DIR};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub dir: String,
    pub command: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            dir: String::from(DEFAULT_WEB_DIR),
            command: String::from(DEFAULT_WEB_COMMAND),
        }
    }
}

impl WebConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.dir.trim().is_empty() {
            return Err(ConfigError::web("web.dir must not be empty"));
        }

        if self.command.trim().is_empty() {
            return Err(ConfigError::web("web.command must not be empty"));
        }

        Ok(())
    }
}
