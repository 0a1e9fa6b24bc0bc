//! CGI invocation subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request (+ resolved executable)
//!     → env.rs (CGI variables + child policy)
//!     → process.rs (spawn, body → stdin, header block read from stdout)
//!     → response.rs (status + headers; remaining stdout streams as the body)
//! ```
//!
//! # Design Decisions
//! - One child process per request, never reused
//! - Children run in the server's working directory
//! - Failures stay local to the request that hit them

pub mod env;
pub mod process;
pub mod response;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::ChildEnvironmentPolicy;
use crate::routing::ExecutableDescriptor;

pub use env::{build_env, CgiEnv, CgiRequest};
pub use process::CgiProcess;
pub use response::{read_head, CgiHead, CgiResponse};

/// Errors from a single CGI invocation.
#[derive(Debug, Error)]
pub enum CgiError {
    #[error("chunked request bodies are not supported by CGI")]
    ChunkedBody,

    #[error("failed to start {}: {source}", .path.display())]
    Spawn { path: PathBuf, source: io::Error },

    #[error("I/O error talking to CGI child: {0}")]
    Io(#[from] io::Error),

    #[error("CGI child produced no headers")]
    NoHeaders,

    #[error("CGI child header block exceeds {} bytes", response::MAX_HEADER_BYTES)]
    HeadersTooLarge,

    #[error("CGI child sent no Status, Location or Content-Type header")]
    MissingContentType,

    #[error("CGI child sent bad Status header {0:?}")]
    BadStatus(String),
}

impl CgiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CgiError::ChunkedBody => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CgiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            CgiError::ChunkedBody => {
                (status, "Chunked request bodies are not supported by CGI.").into_response()
            }
            _ => status.into_response(),
        }
    }
}

/// Runs executables under the CGI contract.
#[derive(Debug, Clone)]
pub struct CgiHandler {
    policy: ChildEnvironmentPolicy,
    working_dir: PathBuf,
}

impl CgiHandler {
    /// Children run in the server's working directory.
    pub fn new(policy: ChildEnvironmentPolicy) -> Self {
        Self {
            policy,
            working_dir: PathBuf::from("."),
        }
    }

    /// Run `executable` for `request` and answer once its headers are in.
    ///
    /// `path_info` is the decoded request path. The response body keeps
    /// streaming from the child after this returns.
    pub async fn serve(
        &self,
        executable: &ExecutableDescriptor,
        path_info: &str,
        remote_addr: Option<SocketAddr>,
        request: Request<Body>,
    ) -> Result<CgiResponse, CgiError> {
        let (parts, body) = request.into_parts();

        let chunked = parts
            .headers
            .get_all(TRANSFER_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.to_ascii_lowercase().contains("chunked"));
        if chunked {
            return Err(CgiError::ChunkedBody);
        }

        let has_body = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .is_some_and(|len| len > 0);

        let env = build_env(
            &CgiRequest {
                parts: &parts,
                path_info,
                script: executable.path(),
                remote_addr,
            },
            &self.policy,
        );

        let process = CgiProcess::spawn(executable.path(), &env, &self.working_dir, has_body)?;
        process.run(body).await
    }
}
