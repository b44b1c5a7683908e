mod config;
mod error;
mod health_config;
mod log_level;
mod logging_config;
mod server_config;
mod setup_config;
mod shutdown_config;
mod web_config;

#[cfg(test)]
mod tests;

pub use config::{CONFIG_PATH_ENV, Config};
pub use error::{ConfigError, ConfigErrorResult};
pub use health_config::HealthConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use server_config::ServerConfig;
pub use setup_config::SetupConfig;
pub use shutdown_config::ShutdownConfig;
pub use web_config::WebConfig;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "dev.toml";

const DEFAULT_SERVER_DIR: &str = "server";
const DEFAULT_SERVER_COMMAND: &str = "npm run dev";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_HEALTH_PATH: &str = "/api/health";

const DEFAULT_WEB_DIR: &str = "web";
const DEFAULT_WEB_COMMAND: &str = "npm run dev";

const DEFAULT_INSTALL_COMMAND: &str = "npm install";
const DEFAULT_INSTALL_MARKER: &str = "node_modules";
const DEFAULT_GENERATE_COMMAND: &str = "npx prisma generate";
const DEFAULT_GENERATE_MARKER: &str = "node_modules/.prisma/client/index.js";

const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_HEALTH_INTERVAL_MS: u64 = 500;
const DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS: u64 = 2_000;

const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 2_000;

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_COLORED: bool = true;
