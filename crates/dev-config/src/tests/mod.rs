mod config;

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

/// Variables read by `Config::load`, cleared so the host environment cannot leak in.
const OVERRIDE_VARS: [&str; 12] = [
    "DEV_CONFIG",
    "PORT",
    "SERVER_PORT",
    "DEV_SERVER_DIR",
    "DEV_SERVER_COMMAND",
    "DEV_WEB_DIR",
    "DEV_WEB_COMMAND",
    "DEV_HEALTH_TIMEOUT_MS",
    "DEV_HEALTH_INTERVAL_MS",
    "DEV_SHUTDOWN_GRACE_MS",
    "DEV_LOG_LEVEL",
    "DEV_LOG_COLORED",
];

/// RAII guard for environment variables - automatically restores on drop
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::set_var(key, value);
            Self { key, original }
        }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::remove_var(key);
            Self { key, original }
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }
}

/// A scratch directory plus a clean override environment.
pub(crate) struct TestEnv {
    pub(crate) dir: TempDir,
    original_cwd: Option<PathBuf>,
    _guards: Vec<EnvGuard>,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        let guards = OVERRIDE_VARS.iter().map(|&key| EnvGuard::remove(key)).collect();
        Self {
            dir: TempDir::new().unwrap(),
            original_cwd: None,
            _guards: guards,
        }
    }

    /// Make the scratch directory the working directory until drop.
    pub(crate) fn enter(&mut self) {
        self.original_cwd = Some(env::current_dir().unwrap());
        env::set_current_dir(self.dir.path()).unwrap();
    }

    /// Write `contents` to dev.toml in the scratch directory and return its path.
    pub(crate) fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join(crate::DEFAULT_CONFIG_FILENAME);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        if let Some(cwd) = self.original_cwd.take() {
            env::set_current_dir(cwd).ok();
        }
    }
}
