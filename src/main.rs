//! `wrc`: a small reverse proxy / static file server.
//!
//! ```text
//! wrc [options] <host/path>
//!
//!   http(s)://host/base   proxy everything to the upstream,
//!                         /api... to -api when given
//!   ./some/dir            serve files, gated by -token when given
//! ```

use std::process::ExitCode;

use wrc::config::Cli;
use wrc::lifecycle::{signals, startup, Shutdown, StartupError};
use wrc::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse_normalized().into_config() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e);
            return ExitCode::SUCCESS;
        }
    };

    logging::init(config.observability.log_filter.as_deref());

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    match startup::run(config, shutdown.subscribe()).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(StartupError::Config(e)) => {
            println!("{}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Failed to start server: {}", e);
            ExitCode::FAILURE
        }
    }
}
