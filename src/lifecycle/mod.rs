//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Discover executables → Build routing table → Report → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: table first, listener last
//! - In-flight requests (and their children) finish before exit

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_routing_table, run, StartupError};
