use crate::error::{LauncherError, Result as LauncherResult};

use std::time::SystemTime;

use dev_config::LogLevel;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::debug;

/// Initialize the launcher's own logger with fern.
///
/// Everything goes to stderr; stdout carries only relayed child stdout.
///
/// # Arguments
/// * `log_level` - Log level filter
/// * `colored` - Colour the level names
pub fn initialize(log_level: LogLevel, colored: bool) -> LauncherResult<()> {
    let level_filter = log_level.0;

    let dispatch = if colored {
        let colors = ColoredLevelConfig::new()
            .trace(Color::Magenta)
            .debug(Color::Blue)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red);

        Dispatch::new().format(move |out, message, record| {
            out.finish(format_args!(
                "[dev {date} - {level}] {message}",
                date = humantime::format_rfc3339_seconds(SystemTime::now()),
                level = colors.color(record.level()),
                message = message,
            ))
        })
    } else {
        Dispatch::new().format(|out, message, record| {
            out.finish(format_args!(
                "[dev {date} - {level}] {message}",
                date = humantime::format_rfc3339_seconds(SystemTime::now()),
                level = record.level(),
                message = message,
            ))
        })
    };

    Dispatch::new()
        .level(level_filter)
        .chain(dispatch.chain(std::io::stderr()))
        .apply()
        .map_err(|e| LauncherError::Logger {
            message: format!("Failed to initialize logger: {e}"),
        })?;

    debug!("Logger initialized: level={level_filter:?}, colored={colored}");

    Ok(())
}
