//! CGI Directory Server Library
//!
//! Serves every executable in one directory as an HTTP resource: `qux`
//! answers `/qux`, and `_` answers `/` (plus, in wildcard mode, anything
//! left unmatched).

pub mod cgi;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use cgi::CgiHandler;
pub use config::{ChildEnvironmentPolicy, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RoutingTable;
