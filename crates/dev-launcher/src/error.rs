use crate::process::ProcessExit;

use std::panic::Location;
use std::path::PathBuf;

use dev_config::ConfigError;
use error_location::ErrorLocation;
use thiserror::Error;

/// Exit code for launcher failures that happen before or while spawning children.
pub const FAILURE_EXIT_CODE: u8 = 1;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Dependency install in {dir} failed ({exit}) {location}")]
    Install {
        dir: PathBuf,
        exit: ProcessExit,
        location: ErrorLocation,
    },

    #[error("Command '{name}' failed ({exit}) {location}")]
    Command {
        name: String,
        exit: ProcessExit,
        location: ErrorLocation,
    },

    #[error("Health check at {url} timed out after {timeout_ms}ms ({attempts} attempts) {location}")]
    TimedOut {
        url: String,
        timeout_ms: u64,
        attempts: u32,
        location: ErrorLocation,
    },

    #[error("Failed to spawn '{name}': {source} {location}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("HTTP client error: {source} {location}")]
    Http {
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },
}

impl LauncherError {
    #[track_caller]
    pub fn install(dir: impl Into<PathBuf>, exit: ProcessExit) -> Self {
        Self::Install {
            dir: dir.into(),
            exit,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn command(name: impl Into<String>, exit: ProcessExit) -> Self {
        Self::Command {
            name: name.into(),
            exit,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn spawn(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            name: name.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether this error aborts the launch.
    ///
    /// Generation failures and health timeouts are downgraded to warnings.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Command { .. } | Self::TimedOut { .. })
    }

    pub fn exit_code(&self) -> u8 {
        FAILURE_EXIT_CODE
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Install { .. } => {
                "Dependency installation failed. \
                   Run the install command by hand in that directory to see the full error."
            }
            Self::Spawn { .. } => {
                "The command could not be started. \
                   Check that the shell is available and the working directory exists."
            }
            Self::Config(_) => {
                "Configuration is invalid. \
                   Fix dev.toml or the DEV_* / PORT environment variables."
            }
            Self::TimedOut { .. } => {
                "The server did not answer its health endpoint in time. \
                   Check the [server] output above."
            }
            Self::Command { .. } => "A setup command failed. Check its output above.",
            _ => "An unexpected error occurred. Run with --log-level debug for details.",
        }
    }
}

impl From<std::io::Error> for LauncherError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for LauncherError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
