//! Idempotent preparation steps gated by marker files.

use crate::error::{LauncherError, Result as LauncherResult};
use crate::process::ProcessHandle;
use crate::{GENERATE_NAME, INSTALLER_NAME};

use std::path::Path;

use dev_config::SetupConfig;
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The command ran and succeeded
    Ran,
    /// Marker present (or step disabled); nothing was run
    Skipped,
    /// The command failed and the failure was tolerated
    Failed,
}

/// Runs install and code-generation commands when their markers are missing.
///
/// Markers are only observed; the commands themselves are expected to create them.
#[derive(Debug, Clone)]
pub struct SetupRunner {
    config: SetupConfig,
}

impl SetupRunner {
    pub fn new(config: SetupConfig) -> Self {
        Self { config }
    }

    /// Install dependencies in `dir` unless its install marker exists.
    ///
    /// A failed install is an `Install` error and aborts the launch.
    pub async fn ensure_installed(&self, dir: &Path) -> LauncherResult<SetupOutcome> {
        if !self.config.install_enabled() {
            debug!("Install step disabled, skipping {}", dir.display());
            return Ok(SetupOutcome::Skipped);
        }

        let marker = dir.join(&self.config.install_marker);
        if marker.exists() {
            debug!("Found {}, dependencies already installed", marker.display());
            return Ok(SetupOutcome::Skipped);
        }

        info!("Installing dependencies in {}", dir.display());
        match Self::run_command_await(&self.config.install_command, &[], dir, INSTALLER_NAME).await {
            Ok(()) => Ok(SetupOutcome::Ran),
            Err(LauncherError::Command { exit, .. }) => Err(LauncherError::install(dir, exit)),
            Err(e) => Err(e),
        }
    }

    /// Run code generation in `dir` unless its generation marker exists.
    ///
    /// Never fails: the server may still start against a stale generated
    /// artifact, so errors are logged and startup carries on.
    pub async fn ensure_generated(&self, dir: &Path) -> SetupOutcome {
        if !self.config.generate_enabled() {
            debug!("Generate step disabled, skipping {}", dir.display());
            return SetupOutcome::Skipped;
        }

        let marker = dir.join(&self.config.generate_marker);
        if marker.exists() {
            debug!("Found {}, code generation already done", marker.display());
            return SetupOutcome::Skipped;
        }

        info!("Generating code in {}", dir.display());
        match Self::run_command_await(&self.config.generate_command, &[], dir, GENERATE_NAME).await {
            Ok(()) => SetupOutcome::Ran,
            Err(e) => {
                warn!("Code generation failed, continuing anyway: {e}");
                SetupOutcome::Failed
            }
        }
    }

    /// Run one named command to completion; any non-zero exit is a `Command` error.
    pub async fn run_command_await(
        command: &str,
        args: &[&str],
        dir: &Path,
        name: &str,
    ) -> LauncherResult<()> {
        let mut handle = ProcessHandle::spawn(command, args, dir, name)?;
        let exit = handle.wait().await;

        if exit.success() {
            Ok(())
        } else {
            Err(LauncherError::command(name, exit))
        }
    }
}
