//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → tower-http TraceLayer (one span per request)
//!
//! Consumers:
//!     → stderr
//! ```

pub mod logging;
