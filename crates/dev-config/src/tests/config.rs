use crate::tests::{EnvGuard, TestEnv};
use crate::{CONFIG_PATH_ENV, Config, LogLevel};

use googletest::assert_that;
use googletest::prelude::{anything, eq, ok};
use log::LevelFilter;
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let mut env = TestEnv::new();
    env.enter();

    // When
    let result = Config::load(None);

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
    assert_that!(config.server.dir.as_str(), eq("server"));
    assert_that!(config.web.dir.as_str(), eq("web"));
    assert_that!(config.health.attempt_timeout_ms, eq(2_000));
    assert_that!(config.shutdown.grace_ms, eq(2_000));
    assert_that!(config.logging.level, eq(LogLevel(LevelFilter::Info)));
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let mut env = TestEnv::new();
    env.enter();

    // When
    let config = Config::load(None).unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_dev_toml_in_working_dir_when_load_then_uses_toml_values() {
    // Given
    let mut env = TestEnv::new();
    env.write_config(
        r#"
            [server]
            dir = "api"
            command = "cargo run"
            port = 4000

            [web]
            command = "pnpm dev"

            [health]
            interval_ms = 250
        "#,
    );
    env.enter();

    // When
    let config = Config::load(None).unwrap();

    // Then
    assert_that!(config.server.dir.as_str(), eq("api"));
    assert_that!(config.server.command.as_str(), eq("cargo run"));
    assert_that!(config.server.port, eq(4000));
    assert_that!(config.web.command.as_str(), eq("pnpm dev"));
    assert_that!(config.web.dir.as_str(), eq("web"));
    assert_that!(config.health.interval_ms, eq(250));
    assert_that!(config.health.timeout_ms, eq(crate::DEFAULT_HEALTH_TIMEOUT_MS));
}

#[test]
#[serial]
fn given_config_env_var_when_load_then_reads_that_file() {
    // Given
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
            [shutdown]
            grace_ms = 500
        "#,
    );
    let _config = EnvGuard::set(CONFIG_PATH_ENV, path.to_str().unwrap());

    // When
    let config = Config::load(None).unwrap();

    // Then
    assert_that!(config.shutdown.grace_ms, eq(500));
}

#[test]
#[serial]
fn given_setup_section_when_load_then_empty_command_disables_step() {
    // Given
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
            [setup]
            generate_command = ""
        "#,
    );

    // When
    let config = Config::load(Some(&path)).unwrap();

    // Then
    assert_that!(config.setup.install_enabled(), eq(true));
    assert_that!(config.setup.generate_enabled(), eq(false));
}

// =========================================================================
// Environment Overrides
// =========================================================================

#[test]
#[serial]
fn given_port_env_when_load_then_overrides_port() {
    // Given
    let env = TestEnv::new();
    let path = env.write_config("");
    let _port = EnvGuard::set("PORT", "4100");

    // When
    let config = Config::load(Some(&path)).unwrap();

    // Then
    assert_that!(config.server.port, eq(4100));
}

#[test]
#[serial]
fn given_server_port_and_port_env_when_load_then_server_port_wins() {
    // Given
    let env = TestEnv::new();
    let path = env.write_config("");
    let _port = EnvGuard::set("PORT", "4100");
    let _server_port = EnvGuard::set("SERVER_PORT", "4200");

    // When
    let config = Config::load(Some(&path)).unwrap();

    // Then
    assert_that!(config.server.port, eq(4200));
}

#[test]
#[serial]
fn given_env_overrides_when_load_then_env_beats_toml() {
    // Given
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
            [server]
            port = 4000

            [logging]
            level = "warn"
            colored = true
        "#,
    );
    let _port = EnvGuard::set("SERVER_PORT", "5000");
    let _level = EnvGuard::set("DEV_LOG_LEVEL", "debug");
    let _colored = EnvGuard::set("DEV_LOG_COLORED", "false");
    let _web = EnvGuard::set("DEV_WEB_COMMAND", "yarn start");

    // When
    let config = Config::load(Some(&path)).unwrap();

    // Then
    assert_that!(config.server.port, eq(5000));
    assert_that!(config.logging.level, eq(LogLevel(LevelFilter::Debug)));
    assert_that!(config.logging.colored, eq(false));
    assert_that!(config.web.command.as_str(), eq("yarn start"));
}

#[test]
#[serial]
fn given_unparseable_port_env_when_load_then_keeps_default() {
    // Given
    let env = TestEnv::new();
    let path = env.write_config("");
    let _port = EnvGuard::set("PORT", "not-a-port");

    // When
    let config = Config::load(Some(&path)).unwrap();

    // Then
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
}

#[test]
#[serial]
fn given_defaults_when_health_url_then_points_at_api_health() {
    // Given
    let env = TestEnv::new();
    let path = env.write_config("");

    // When
    let config = Config::load(Some(&path)).unwrap();

    // Then
    assert_that!(
        config.health_url().as_str(),
        eq("http://127.0.0.1:3001/api/health")
    );
}
