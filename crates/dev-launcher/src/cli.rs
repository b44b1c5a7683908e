use crate::error::Result as LauncherResult;

use std::path::PathBuf;

use clap::Parser;
use dev_config::{Config, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "dev")]
#[command(about = "Start the server, wait for it to be healthy, then start the web app")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./dev.toml, or the DEV_CONFIG environment variable)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Launcher log level: off, error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<String>,

    /// Disable coloured log levels
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file and environment settings.
    pub fn apply(&self, config: &mut Config) -> LauncherResult<()> {
        if let Some(ref level) = self.log_level {
            config.logging.level = level.parse::<LogLevel>()?;
        }

        if self.no_color {
            config.logging.colored = false;
        }

        Ok(())
    }
}
