use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_GENERATE_COMMAND, DEFAULT_GENERATE_MARKER,
    DEFAULT_INSTALL_COMMAND, DEFAULT_INSTALL_MARKER,
};

use serde::Deserialize;

/// Preparation steps run before each child starts.
///
/// Markers are paths relative to the child's directory. An empty command
/// disables the step.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    pub install_command: String,
    pub install_marker: String,
    /// Code generation, run in the server directory only
    pub generate_command: String,
    pub generate_marker: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            install_command: String::from(DEFAULT_INSTALL_COMMAND),
            install_marker: String::from(DEFAULT_INSTALL_MARKER),
            generate_command: String::from(DEFAULT_GENERATE_COMMAND),
            generate_marker: String::from(DEFAULT_GENERATE_MARKER),
        }
    }
}

impl SetupConfig {
    pub fn install_enabled(&self) -> bool {
        !self.install_command.trim().is_empty()
    }

    pub fn generate_enabled(&self) -> bool {
        !self.generate_command.trim().is_empty()
    }

    /// An enabled step needs a marker; an empty marker resolves to the
    /// directory itself, which always exists, so the step would never run.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.install_enabled() && self.install_marker.trim().is_empty() {
            return Err(ConfigError::setup(
                "setup.install_marker must not be empty while install_command is set",
            ));
        }

        if self.generate_enabled() && self.generate_marker.trim().is_empty() {
            return Err(ConfigError::setup(
                "setup.generate_marker must not be empty while generate_command is set",
            ));
        }

        Ok(())
    }
}
