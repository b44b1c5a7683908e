//! Backend health gating.

use crate::error::{LauncherError, Result as LauncherResult};

use std::panic::Location;
use std::time::{Duration, Instant};

use dev_config::Config;
use error_location::ErrorLocation;
use log::{debug, info};

/// Statuses in this range mean "something is listening and routing".
///
/// 4xx deliberately counts as healthy: the probe only needs the server up,
/// not the health route itself to succeed.
const HEALTHY_STATUS_RANGE: std::ops::Range<u16> = 200..500;

/// Outcome of a successful wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub attempts: u32,
    pub elapsed: Duration,
    pub status: u16,
}

/// Polls one URL until it answers with a healthy status or the window closes.
pub struct HealthProber {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    interval: Duration,
    attempt_timeout: Duration,
}

impl HealthProber {
    pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(2_000);

    /// Create a prober for `url` with the default per-attempt timeout.
    ///
    /// # Arguments
    /// * `timeout` - Overall window, measured from the first attempt
    /// * `interval` - Delay between failed attempts
    pub fn new(url: impl Into<String>, timeout: Duration, interval: Duration) -> LauncherResult<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(1)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
            interval,
            attempt_timeout: Self::DEFAULT_ATTEMPT_TIMEOUT,
        })
    }

    pub fn from_config(config: &Config) -> LauncherResult<Self> {
        Ok(Self::new(
            config.health_url(),
            config.health.timeout(),
            config.health.interval(),
        )?
        .with_attempt_timeout(config.health.attempt_timeout()))
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn is_healthy_status(status: u16) -> bool {
        HEALTHY_STATUS_RANGE.contains(&status)
    }

    /// Poll until healthy, or fail with `TimedOut`.
    ///
    /// Each attempt is capped at the per-attempt timeout and at whatever is
    /// left of the overall window (never less than one interval), so a hung
    /// connection cannot hold the wait open.
    pub async fn wait_for_health(&self) -> LauncherResult<HealthReport> {
        let start = Instant::now();
        let mut attempts = 0u32;

        info!("Waiting for {} (timeout {}ms)", self.url, self.timeout.as_millis());

        loop {
            attempts += 1;

            let remaining = self.timeout.saturating_sub(start.elapsed());
            let limit = self.attempt_timeout.min(remaining.max(self.interval));

            match self.probe(limit).await {
                Ok(status) => {
                    let elapsed = start.elapsed();
                    info!(
                        "{} healthy (HTTP {status}) after {attempts} attempt(s), {}ms",
                        self.url,
                        elapsed.as_millis()
                    );
                    return Ok(HealthReport {
                        attempts,
                        elapsed,
                        status,
                    });
                }
                Err(reason) => {
                    debug!("Health attempt {attempts} against {} failed: {reason}", self.url);
                }
            }

            if start.elapsed() >= self.timeout {
                return Err(LauncherError::TimedOut {
                    url: self.url.clone(),
                    timeout_ms: self.timeout.as_millis() as u64,
                    attempts,
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    /// One GET, returning the status when it counts as healthy.
    async fn probe(&self, limit: Duration) -> Result<u16, String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(limit)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        if Self::is_healthy_status(status) {
            Ok(status)
        } else {
            Err(format!("HTTP {status}"))
        }
    }
}
