//! Startup orchestration.
//!
//! # Responsibilities
//! - Discover executables and freeze the routing table
//! - Print the mapping report for the operator
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The table is complete before the listener exists
//! - Listeners start last (traffic only when ready)

use std::io::{self, Write};
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::cgi::CgiHandler;
use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::routing::{discover_executables, DiscoveryError, RoutingTable};

/// Fatal errors before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Scan the executables directory and build the routing table.
pub fn build_routing_table(config: &ServerConfig) -> Result<RoutingTable, DiscoveryError> {
    let executables = discover_executables(&config.executables_dir)?;
    let table = RoutingTable::build(executables, config.wildcard);

    tracing::info!(
        dir = %config.executables_dir.display(),
        routes = table.len(),
        wildcard = table.wildcard().is_some(),
        "Routing table built"
    );
    Ok(table)
}

/// Build everything, bind, and serve until Ctrl+C.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    let table = build_routing_table(&config)?;

    // Operator report goes to stderr regardless of the log filter.
    {
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(table.report().as_bytes());
        let _ = stderr.flush();
    }

    let policy = config.env_policy();
    tracing::info!(policy = policy.name(), "Child environment policy resolved");
    let server = HttpServer::new(table, CgiHandler::new(policy));

    let addr = config.bind_address();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_routing_table() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "").unwrap();
        fs::write(dir.path().join("_"), "").unwrap();

        let mut config = ServerConfig::new(dir.path());
        config.wildcard = true;
        let table = build_routing_table(&config).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get("/a").is_some());
        assert!(table.wildcard().is_some());
    }

    #[test]
    fn test_missing_dir_is_fatal() {
        let config = ServerConfig::new("/definitely/not/here");
        assert!(build_routing_table(&config).is_err());
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let mut config = ServerConfig::new(dir.path());
        config.port = taken.local_addr().unwrap().port();

        let err = run(config).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
    }
}
