//! dev - local development launcher
//!
//! ```bash
//! # Start server (waits for /api/health) then web, using ./dev.toml if present
//! dev
//!
//! # Different backend port, verbose launcher logs
//! SERVER_PORT=4000 dev --log-level debug
//! ```

use dev_config::Config;
use dev_launcher::{
    Cli, FAILURE_EXIT_CODE, LauncherResult, Supervisor, initialize_logger, shutdown_signal,
};

use clap::Parser;
use log::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => u8::try_from(code).unwrap_or(FAILURE_EXIT_CODE),
        Err(e) => {
            eprintln!("[dev] Error: {e}");
            eprintln!("[dev] {}", e.recovery_hint());
            e.exit_code()
        }
    };

    log::logger().flush();

    // Exit right away rather than waiting on tasks still relaying output of
    // children that outlived the grace window
    std::process::exit(i32::from(code));
}

async fn run(cli: Cli) -> LauncherResult<i32> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config)?;
    config.validate()?;

    initialize_logger(config.logging.level, config.logging.colored)?;

    info!("Starting dev launcher v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let root = std::env::current_dir()?;
    Supervisor::new(config, root).run(shutdown_signal()).await
}
