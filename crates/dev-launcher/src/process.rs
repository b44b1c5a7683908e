//! Child processes started through the shell.
//!
//! A [`ProcessHandle`] owns one child: its output is relayed with a
//! `[<name>] ` prefix, its exit arrives exactly once on a oneshot channel, and
//! [`ProcessHandle::terminate`] asks it to stop.
//!
//! Commands run through `sh -c` (`cmd /C` on Windows) so shell operators in
//! configured command lines work. This is local developer tooling: command
//! lines come from the developer's own config and are trusted.

use crate::error::{LauncherError, Result as LauncherResult};
use crate::relay::{OutputRelay, OutputStream, pump};

use std::fmt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Offset added to a signal number when a signal death is reported as an exit code.
const SIGNAL_EXIT_BASE: i32 = 128;

/// How a child process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessExit {
    /// Normal exit with this code
    Code(i32),
    /// Killed by a signal
    Signal { name: String, number: i32 },
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        matches!(self, Self::Code(0))
    }

    /// Code to propagate to our own parent; signal deaths map to 128 + signal number.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Code(code) => *code,
            Self::Signal { number, .. } => SIGNAL_EXIT_BASE + number,
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit code {code}"),
            Self::Signal { name, .. } => write!(f, "signal {name}"),
        }
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;

            if let Some(number) = status.signal() {
                return Self::Signal {
                    name: signal_name(number),
                    number,
                };
            }
        }

        Self::Code(1)
    }
}

#[cfg(unix)]
fn signal_name(number: i32) -> String {
    nix::sys::signal::Signal::try_from(number)
        .map(|signal| signal.as_str().to_string())
        .unwrap_or_else(|_| format!("SIG{number}"))
}

/// A running (or finished) child process.
pub struct ProcessHandle {
    name: String,
    pid: Option<u32>,
    exit_rx: oneshot::Receiver<ProcessExit>,
    exit: Option<ProcessExit>,
    exited: Arc<AtomicBool>,
    terminate_sent: AtomicBool,
}

impl ProcessHandle {
    /// Spawn `command` with `args` in `dir`, inheriting the launcher's environment.
    ///
    /// Arguments are appended to the command line separated by spaces, without
    /// quoting, and the result is interpreted by the shell.
    pub fn spawn(command: &str, args: &[&str], dir: &Path, name: &str) -> LauncherResult<Self> {
        Self::spawn_with_env(command, args, dir, name, &[])
    }

    /// Like [`ProcessHandle::spawn`], with extra environment variables for the child.
    pub fn spawn_with_env(
        command: &str,
        args: &[&str],
        dir: &Path,
        name: &str,
        env: &[(&str, String)],
    ) -> LauncherResult<Self> {
        let command_line = std::iter::once(command)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = shell_command(&command_line);
        cmd.current_dir(dir)
            .envs(env.iter().map(|(key, value)| (*key, value.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so SIGTERM reaches everything the shell started
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| LauncherError::spawn(name, e))?;
        let pid = child.id();

        info!(
            "Started {name} (pid {}): `{command_line}` in {}",
            pid.map_or_else(|| String::from("?"), |p| p.to_string()),
            dir.display()
        );

        let (line_tx, line_rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump(stdout, OutputStream::Stdout, line_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(pump(stderr, OutputStream::Stderr, line_tx.clone()));
        }
        drop(line_tx);

        let relay = OutputRelay::new(name, tokio::io::stdout(), tokio::io::stderr());
        let relay_name = name.to_string();
        tokio::spawn(async move {
            if let Err(e) = relay.run(line_rx).await {
                debug!("Output relay for {relay_name} stopped: {e}");
            }
        });

        let (exit_tx, exit_rx) = oneshot::channel();
        let exited = Arc::new(AtomicBool::new(false));
        let exited_flag = exited.clone();
        let waiter_name = name.to_string();
        tokio::spawn(async move {
            let exit = match child.wait().await {
                Ok(status) => ProcessExit::from(status),
                Err(e) => {
                    error!("Failed to wait for {waiter_name}: {e}");
                    ProcessExit::Code(1)
                }
            };
            exited_flag.store(true, Ordering::SeqCst);

            match &exit {
                ProcessExit::Code(code) => info!("{waiter_name} exited with code {code}"),
                ProcessExit::Signal { name, .. } => info!("{waiter_name} terminated by {name}"),
            }

            let _ = exit_tx.send(exit);
        });

        Ok(Self {
            name: name.to_string(),
            pid,
            exit_rx,
            exit: None,
            exited,
            terminate_sent: AtomicBool::new(false),
        })
    }

    pub fn is_running(&self) -> bool {
        !self.exited.load(Ordering::SeqCst)
    }

    /// Wait for the child to exit.
    ///
    /// Cancel-safe, and returns the same exit on every call once it has fired.
    pub async fn wait(&mut self) -> ProcessExit {
        if let Some(ref exit) = self.exit {
            return exit.clone();
        }

        let exit = match (&mut self.exit_rx).await {
            Ok(exit) => exit,
            Err(_) => {
                warn!("Lost exit notification for {}", self.name);
                ProcessExit::Code(1)
            }
        };
        self.exit = Some(exit.clone());
        exit
    }

    /// Ask the child to stop with SIGTERM.
    ///
    /// Does not wait. Calling it again, or after the child has exited, is harmless.
    pub fn terminate(&self) {
        self.terminate_sent.store(true, Ordering::SeqCst);

        if !self.is_running() {
            debug!("{} already exited, not sending SIGTERM", self.name);
            return;
        }

        let Some(pid) = self.pid else {
            return;
        };

        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            match killpg(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => info!("Sent SIGTERM to {} (pid {pid})", self.name),
                Err(e) => debug!("SIGTERM to {} (pid {pid}) failed: {e}", self.name),
            }
        }

        #[cfg(windows)]
        {
            match std::process::Command::new("taskkill")
                .args(["/T", "/PID", &pid.to_string()])
                .output()
            {
                Ok(_) => info!("Requested {} (pid {pid}) to stop", self.name),
                Err(e) => debug!("taskkill for {} (pid {pid}) failed: {e}", self.name),
            }
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if self.is_running() && !self.terminate_sent.load(Ordering::SeqCst) {
            self.terminate();
        }
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}
