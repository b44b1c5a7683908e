use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CONFIG_FILENAME, HealthConfig, LoggingConfig,
    ServerConfig, SetupConfig, ShutdownConfig, WebConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DEV_CONFIG";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub web: WebConfig,
    pub setup: SetupConfig,
    pub health: HealthConfig,
    pub shutdown: ShutdownConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. `path` if given, else DEV_CONFIG if set (either must exist)
    /// 2. Otherwise ./dev.toml if it exists, else defaults
    /// 3. Apply environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load(path: Option<&Path>) -> ConfigErrorResult<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Self::load_toml(&path)?
            }
            None => {
                let default_path = Self::default_path()?;
                if default_path.exists() {
                    Self::load_toml(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// ./dev.toml relative to the current working directory.
    pub fn default_path() -> ConfigErrorResult<PathBuf> {
        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_FILENAME))
    }

    /// Validate all configuration.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.web.validate()?;
        self.setup.validate()?;
        self.health.validate()?;
        self.shutdown.validate()?;

        Ok(())
    }

    /// URL polled by the health prober.
    pub fn health_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.server.host, self.server.port, self.server.health_path
        )
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: `{}` in {} (port {})",
            self.server.command, self.server.dir, self.server.port
        );
        info!("  web: `{}` in {}", self.web.command, self.web.dir);
        info!(
            "  setup: install={} (marker {}), generate={} (marker {})",
            if self.setup.install_enabled() {
                self.setup.install_command.as_str()
            } else {
                "disabled"
            },
            self.setup.install_marker,
            if self.setup.generate_enabled() {
                self.setup.generate_command.as_str()
            } else {
                "disabled"
            },
            self.setup.generate_marker
        );
        info!(
            "  health: {} timeout={}ms interval={}ms attempt={}ms",
            self.health_url(),
            self.health.timeout_ms,
            self.health.interval_ms,
            self.health.attempt_timeout_ms
        );
        info!("  shutdown: grace={}ms", self.shutdown.grace_ms);
        info!(
            "  logging: {} (colored: {})",
            self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server (SERVER_PORT wins over PORT)
        Self::apply_env_parse("PORT", &mut self.server.port);
        Self::apply_env_parse("SERVER_PORT", &mut self.server.port);
        Self::apply_env_string("DEV_SERVER_DIR", &mut self.server.dir);
        Self::apply_env_string("DEV_SERVER_COMMAND", &mut self.server.command);

        // Web
        Self::apply_env_string("DEV_WEB_DIR", &mut self.web.dir);
        Self::apply_env_string("DEV_WEB_COMMAND", &mut self.web.command);

        // Health
        Self::apply_env_parse("DEV_HEALTH_TIMEOUT_MS", &mut self.health.timeout_ms);
        Self::apply_env_parse("DEV_HEALTH_INTERVAL_MS", &mut self.health.interval_ms);

        // Shutdown
        Self::apply_env_parse("DEV_SHUTDOWN_GRACE_MS", &mut self.shutdown.grace_ms);

        // Logging
        Self::apply_env_parse("DEV_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("DEV_LOG_COLORED", &mut self.logging.colored);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.trim().parse()
        {
            *target = parsed;
        }
    }
}
