use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_HEALTH_PATH, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_SERVER_COMMAND, DEFAULT_SERVER_DIR,
};

use serde::Deserialize;

/// The backend child: where it lives, how it starts and where it answers health probes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Working directory, relative to the launcher's working directory
    pub dir: String,
    /// Shell command line that runs the backend
    pub command: String,
    pub host: String,
    /// Listen port, exported to the backend as PORT and SERVER_PORT
    pub port: u16,
    pub health_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dir: String::from(DEFAULT_SERVER_DIR),
            command: String::from(DEFAULT_SERVER_COMMAND),
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            health_path: String::from(DEFAULT_HEALTH_PATH),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.dir.trim().is_empty() {
            return Err(ConfigError::server("server.dir must not be empty"));
        }

        if self.command.trim().is_empty() {
            return Err(ConfigError::server("server.command must not be empty"));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::server("server.host must not be empty"));
        }

        if self.port == 0 {
            return Err(ConfigError::server("server.port must be between 1 and 65535"));
        }

        if !self.health_path.starts_with('/') {
            return Err(ConfigError::server(format!(
                "server.health_path must start with '/', got '{}'",
                self.health_path
            )));
        }

        Ok(())
    }
}
