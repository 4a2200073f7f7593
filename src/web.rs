#![cfg(not(tarpaulin_include))]

use websheet::app;
use websheet::config::ServerConfig;

/// Main entry point for the web application
///
/// Reads the configuration (`WEBSHEET_*` variables, then optional
/// `<rows> <cols>` arguments), sets up logging from `RUST_LOG` and serves
/// the sheet until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::load()?;
    log::info!(
        "Starting web server with spreadsheet of {} rows x {} columns",
        config.rows,
        config.cols
    );
    app::run(config).await
}
