use std::fmt;

/// Where the supervisor is in the startup / shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    /// Nothing started yet
    Idle,
    /// Installing backend dependencies and generating code
    PreparingBackend,
    /// Spawning the backend
    BackendStarting,
    /// Polling the backend health endpoint
    WaitingHealth,
    /// Installing frontend dependencies
    PreparingFrontend,
    /// Spawning the frontend
    FrontendStarting,
    /// Both children up; waiting for an exit or a signal
    Running,
    /// Termination requests sent, waiting out the grace window
    ShuttingDown,
    Terminated,
}

impl LaunchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PreparingBackend => "preparing_backend",
            Self::BackendStarting => "backend_starting",
            Self::WaitingHealth => "waiting_health",
            Self::PreparingFrontend => "preparing_frontend",
            Self::FrontendStarting => "frontend_starting",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
