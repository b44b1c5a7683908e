//! Startup sequencing and mutual shutdown of the backend and frontend.

use crate::error::Result as LauncherResult;
use crate::health::HealthProber;
use crate::launch_state::LaunchState;
use crate::process::{ProcessExit, ProcessHandle};
use crate::setup::SetupRunner;
use crate::{SERVER_NAME, WEB_NAME};

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use dev_config::Config;
use log::{info, warn};
use tokio::sync::watch;

/// Why the supervisor started shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// SIGINT / SIGTERM (or whatever shutdown future the caller passed)
    Signal,
    /// One of the children exited on its own
    ChildExit { name: String, exit: ProcessExit },
}

impl ShutdownTrigger {
    fn child(name: &str, exit: ProcessExit) -> Self {
        Self::ChildExit {
            name: name.to_string(),
            exit,
        }
    }

    /// 0 for a requested shutdown, otherwise the child's own exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Signal => 0,
            Self::ChildExit { exit, .. } => exit.exit_code(),
        }
    }
}

/// Owns both long-lived children and drives them through [`LaunchState`].
///
/// Lifecycle:
/// - Install + generate in the server directory, spawn the server
/// - Wait for the server health endpoint (a timeout only warns)
/// - Install in the web directory, spawn the web process
/// - On a signal or either child exiting, SIGTERM both and wait out the grace window
pub struct Supervisor {
    config: Config,
    root: PathBuf,
    setup: SetupRunner,
    server: Option<ProcessHandle>,
    web: Option<ProcessHandle>,
    state_tx: watch::Sender<LaunchState>,
    state_rx: watch::Receiver<LaunchState>,
}

impl Supervisor {
    /// Create a supervisor; child directories are resolved against `root`.
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        let (state_tx, state_rx) = watch::channel(LaunchState::Idle);
        let setup = SetupRunner::new(config.setup.clone());

        Self {
            config,
            root: root.into(),
            setup,
            server: None,
            web: None,
            state_tx,
            state_rx,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LaunchState> {
        self.state_rx.clone()
    }

    /// Run the whole launch until shutdown and return the exit code to use.
    ///
    /// `shutdown` resolving has the same effect as SIGINT/SIGTERM. Fatal
    /// errors are returned after any child already started has been stopped.
    pub async fn run<F>(mut self, shutdown: F) -> LauncherResult<i32>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let trigger = match self.start(shutdown.as_mut()).await {
            Ok(Some(trigger)) => trigger,
            Ok(None) => self.supervise(shutdown.as_mut()).await,
            Err(e) => {
                self.stop_children().await;
                self.set_state(LaunchState::Terminated);
                return Err(e);
            }
        };

        match &trigger {
            ShutdownTrigger::Signal => info!("Shutdown requested, stopping children"),
            ShutdownTrigger::ChildExit { name, exit } => {
                warn!("{name} stopped ({exit}), stopping the rest")
            }
        }

        self.stop_children().await;
        self.set_state(LaunchState::Terminated);

        let code = trigger.exit_code();
        info!("Exiting with code {code}");
        Ok(code)
    }

    /// Startup sequence. `Some(trigger)` means shutdown began before reaching Running.
    async fn start<F>(&mut self, mut shutdown: Pin<&mut F>) -> LauncherResult<Option<ShutdownTrigger>>
    where
        F: Future<Output = ()>,
    {
        let server_dir = self.root.join(&self.config.server.dir);
        let web_dir = self.root.join(&self.config.web.dir);
        let prober = HealthProber::from_config(&self.config)?;

        self.set_state(LaunchState::PreparingBackend);
        let setup = &self.setup;
        let prepare = async {
            setup.ensure_installed(&server_dir).await?;
            setup.ensure_generated(&server_dir).await;
            LauncherResult::Ok(())
        };
        match guarded(prepare, None, shutdown.as_mut()).await {
            Ok(result) => result?,
            Err(trigger) => return Ok(Some(trigger)),
        }

        self.set_state(LaunchState::BackendStarting);
        let port = self.config.server.port.to_string();
        self.server = Some(ProcessHandle::spawn_with_env(
            &self.config.server.command,
            &[],
            &server_dir,
            SERVER_NAME,
            &[("PORT", port.clone()), ("SERVER_PORT", port)],
        )?);

        self.set_state(LaunchState::WaitingHealth);
        match guarded(
            prober.wait_for_health(),
            self.server.as_mut(),
            shutdown.as_mut(),
        )
        .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if !e.is_fatal() => warn!("{e}; starting {WEB_NAME} anyway"),
            Ok(Err(e)) => return Err(e),
            Err(trigger) => return Ok(Some(trigger)),
        }

        self.set_state(LaunchState::PreparingFrontend);
        match guarded(
            self.setup.ensure_installed(&web_dir),
            self.server.as_mut(),
            shutdown.as_mut(),
        )
        .await
        {
            Ok(result) => {
                result?;
            }
            Err(trigger) => return Ok(Some(trigger)),
        }

        self.set_state(LaunchState::FrontendStarting);
        self.web = Some(ProcessHandle::spawn(
            &self.config.web.command,
            &[],
            &web_dir,
            WEB_NAME,
        )?);

        self.set_state(LaunchState::Running);
        info!("{SERVER_NAME} and {WEB_NAME} running, Ctrl+C to stop");

        Ok(None)
    }

    /// Wait for whichever comes first: either child exiting or the shutdown future.
    async fn supervise<F>(&mut self, shutdown: Pin<&mut F>) -> ShutdownTrigger
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            exit = wait_or_pending(self.server.as_mut()) => ShutdownTrigger::child(SERVER_NAME, exit),
            exit = wait_or_pending(self.web.as_mut()) => ShutdownTrigger::child(WEB_NAME, exit),
            _ = shutdown => ShutdownTrigger::Signal,
        }
    }

    /// SIGTERM every child, then wait up to the grace window for them to exit.
    ///
    /// A setup command interrupted by shutdown has already been terminated by
    /// dropping its handle, so there may be nothing left to stop here.
    async fn stop_children(&mut self) {
        self.set_state(LaunchState::ShuttingDown);

        if self.server.is_none() && self.web.is_none() {
            // Watch receivers only see the latest value; let them observe ShuttingDown
            tokio::task::yield_now().await;
            return;
        }

        for handle in [self.server.as_ref(), self.web.as_ref()].into_iter().flatten() {
            handle.terminate();
        }

        let grace = self.config.shutdown.grace();
        let exits = async {
            tokio::join!(
                wait_if_present(self.server.as_mut()),
                wait_if_present(self.web.as_mut())
            )
        };

        if tokio::time::timeout(grace, exits).await.is_err() {
            warn!(
                "Children still running after {}ms grace window, exiting anyway",
                grace.as_millis()
            );
        }

        self.server = None;
        self.web = None;
    }

    fn set_state(&self, state: LaunchState) {
        info!("State: {state}");
        self.state_tx.send_replace(state);
    }
}

/// Run `work` unless the server exits or shutdown is requested first.
async fn guarded<T, W, F>(
    work: W,
    server: Option<&mut ProcessHandle>,
    shutdown: Pin<&mut F>,
) -> Result<T, ShutdownTrigger>
where
    W: Future<Output = T>,
    F: Future<Output = ()>,
{
    tokio::select! {
        output = work => Ok(output),
        exit = wait_or_pending(server) => Err(ShutdownTrigger::child(SERVER_NAME, exit)),
        _ = shutdown => Err(ShutdownTrigger::Signal),
    }
}

async fn wait_or_pending(handle: Option<&mut ProcessHandle>) -> ProcessExit {
    match handle {
        Some(handle) => handle.wait().await,
        None => std::future::pending().await,
    }
}

async fn wait_if_present(handle: Option<&mut ProcessHandle>) -> Option<ProcessExit> {
    match handle {
        Some(handle) => Some(handle.wait().await),
        None => None,
    }
}
