//! dev-launcher library
//!
//! Starts a backend and a frontend for local development: runs their setup
//! steps, waits for the backend health endpoint before starting the frontend,
//! and stops both as soon as either one exits or the launcher is signalled.

pub(crate) mod cli;
pub(crate) mod error;
pub(crate) mod health;
pub(crate) mod launch_state;
pub(crate) mod logger;
pub(crate) mod process;
pub(crate) mod relay;
pub(crate) mod setup;
pub(crate) mod signals;
pub(crate) mod supervisor;


pub use cli::Cli;
pub use error::{FAILURE_EXIT_CODE, LauncherError, Result as LauncherResult};
pub use health::{HealthProber, HealthReport};
pub use launch_state::LaunchState;
pub use logger::initialize as initialize_logger;
pub use process::{ProcessExit, ProcessHandle};
pub use relay::{LineSplitter, OutputLine, OutputRelay, OutputStream, pump};
pub use setup::{SetupOutcome, SetupRunner};
pub use signals::shutdown_signal;
pub use supervisor::{ShutdownTrigger, Supervisor};

/// Name used to tag the backend's output and log lines.
pub const SERVER_NAME: &str = "server";
/// Name used to tag the frontend's output and log lines.
pub const WEB_NAME: &str = "web";
pub const INSTALLER_NAME: &str = "installer";
pub const GENERATE_NAME: &str = "generate";
