//! CGI Directory Server (v1)
//!
//! Exposes a directory of executables over HTTP using CGI.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                    CGISERVE                      │
//!                       │                                                  │
//!     Client Request    │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!     ──────────────────┼─▶│  http   │───▶│ routing  │───▶│     cgi     │  │
//!                       │  │ server  │    │  table   │    │ env+process │──┼──▶ child
//!                       │  └─────────┘    └──────────┘    └──────┬──────┘  │   process
//!                       │                                        │         │
//!     Client Response   │  ┌─────────┐                   ┌───────▼──────┐  │
//!     ◀─────────────────┼──│  http   │◀──────────────────│ cgi response │◀─┼─── stdout
//!                       │  └─────────┘                   └──────────────┘  │
//!                       │                                                  │
//!                       │   config (clap) · lifecycle · observability      │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use cgiserve::config::{Cli, ServerConfig};
use cgiserve::lifecycle;
use cgiserve::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from(Cli::parse());

    logging::init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %config.executables_dir.display(),
        port = config.port,
        wildcard = config.wildcard,
        "cgiserve starting"
    );

    match lifecycle::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("cgiserve: {}", e);
            ExitCode::FAILURE
        }
    }
}
