//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line
//!     → cli.rs (clap parse)
//!     → ServerConfig (immutable)
//!     → env_policy.rs (ChildEnvironmentPolicy, resolved once)
//!     → shared by reference with the startup sequence
//! ```
//!
//! # Design Decisions
//! - Config is immutable once parsed; there is no reload
//! - No config file; every knob is a flag

pub mod cli;
pub mod env_policy;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub use cli::Cli;
pub use env_policy::ChildEnvironmentPolicy;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory scanned for executables at startup.
    pub executables_dir: PathBuf,

    /// TCP port to listen on, on all interfaces.
    pub port: u16,

    /// Children get a copy of the server's environment.
    pub copy_env: bool,

    /// Comma-separated `key=value` list; overrides `copy_env` when non-empty.
    pub with_env: String,

    /// `_` also handles every unmatched resource.
    pub wildcard: bool,
}

impl ServerConfig {
    pub fn new(executables_dir: impl Into<PathBuf>) -> Self {
        Self {
            executables_dir: executables_dir.into(),
            port: 80,
            copy_env: false,
            with_env: String::new(),
            wildcard: false,
        }
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn env_policy(&self) -> ChildEnvironmentPolicy {
        ChildEnvironmentPolicy::resolve(self.copy_env, &self.with_env)
    }
}
