#![cfg(not(tarpaulin_include))]

use clap::Parser;
use tablefill::app;
use tablefill::config::ServerConfig;

/// Main entry point for the processing server
///
/// Reads the configuration from flags / `TABLEFILL_*` variables, sets up
/// logging from `RUST_LOG` and serves until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    log::info!(
        "template {}, browser bundle {}",
        config.template.display(),
        config.pkg_dir.display()
    );

    app::run(config).await
}
