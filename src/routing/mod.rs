//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     executables dir
//!     → discovery.rs (regular files, listing order)
//!     → table.rs (basename → resource path, root + wildcard conventions)
//!     → Freeze as immutable RoutingTable
//!
//! Incoming Request (path):
//!     → path.rs (percent-decode, then clean)
//!     → table.rs (exact lookup, then wildcard)
//!     → Return: matched RouteEntry or no-match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact matching only; no prefixes, no regex
//! - The root executable `_` serves `/` and, in wildcard mode, every
//!   otherwise unmatched path

pub mod discovery;
pub mod path;
pub mod table;

pub use discovery::{discover_executables, DiscoveryError, ExecutableDescriptor};
pub use table::{RouteEntry, RouteKind, RoutingTable, ROOT_EXEC_NAME, ROOT_RESOURCE};
