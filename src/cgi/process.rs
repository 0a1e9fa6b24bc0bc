//! Scoped CGI child process.
//!
//! # Responsibilities
//! - Spawn one executable per request with a cleared environment
//! - Stream the request body into stdin from its own task
//! - Read the header block, then stream the rest of stdout as the body
//! - Wait for exit once stdout reaches EOF
//!
//! # Design Decisions
//! - The `Child` lives inside the response body stream. Dropping the
//!   response (client gone, error, shutdown) drops the child, and
//!   `kill_on_drop` kills it and closes its pipes
//! - stdin is fed independently of stdout so a child that writes before
//!   reading everything cannot deadlock against us
//! - No timeout; a hung child holds its request open

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use axum::body::{Body, Bytes};
use futures_util::{stream, Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::cgi::env::CgiEnv;
use crate::cgi::response::{read_head, CgiResponse};
use crate::cgi::CgiError;

const READ_CHUNK: usize = 8 * 1024;

/// A running CGI child, owned by exactly one request.
#[derive(Debug)]
pub struct CgiProcess {
    child: Child,
    executable: PathBuf,
}

impl CgiProcess {
    /// Spawn `executable` with exactly `env`.
    ///
    /// stdin is only wired up when there is a body to send.
    pub fn spawn(
        executable: &Path,
        env: &CgiEnv,
        working_dir: &Path,
        has_body: bool,
    ) -> Result<Self, CgiError> {
        let child = Command::new(executable)
            .env_clear()
            .envs(env)
            .current_dir(working_dir)
            .stdin(if has_body { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CgiError::Spawn {
                path: executable.to_path_buf(),
                source,
            })?;

        tracing::debug!(executable = %executable.display(), pid = ?child.id(), "CGI child spawned");

        Ok(Self {
            child,
            executable: executable.to_path_buf(),
        })
    }

    /// Feed `body` to the child and return as soon as its headers are in.
    ///
    /// The returned body streams the remaining stdout and owns the child.
    pub async fn run(mut self, body: Body) -> Result<CgiResponse, CgiError> {
        if let Some(stdin) = self.child.stdin.take() {
            let executable = self.executable.clone();
            tokio::spawn(async move {
                match feed_stdin(stdin, body).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        tracing::debug!(executable = %executable.display(), "CGI child closed stdin early");
                    }
                    Err(e) => {
                        tracing::warn!(executable = %executable.display(), error = %e, "Failed to feed CGI stdin");
                    }
                }
            });
        }

        let stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| CgiError::Io(io::Error::other("child stdout not captured")))?;
        let mut reader = BufReader::new(stdout);
        let head = read_head(&mut reader).await?;

        let output = ChildOutput {
            reader,
            child: self.child,
            executable: self.executable,
        };
        Ok(CgiResponse {
            head,
            body: Body::from_stream(output.into_stream()),
        })
    }
}

/// Remaining stdout of a child whose headers have been read.
struct ChildOutput {
    reader: BufReader<ChildStdout>,
    child: Child,
    executable: PathBuf,
}

impl ChildOutput {
    fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        stream::unfold(Some(self), |state| async move {
            let mut output = state?;
            let mut buf = vec![0u8; READ_CHUNK];
            match output.reader.read(&mut buf).await {
                Ok(0) => {
                    output.finish().await;
                    None
                }
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(Bytes::from(buf)), Some(output)))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Reap the child after EOF on stdout.
    async fn finish(mut self) {
        match self.child.wait().await {
            Ok(status) if !status.success() => tracing::warn!(
                executable = %self.executable.display(),
                status = %status,
                "CGI child exited unsuccessfully"
            ),
            Ok(_) => {}
            Err(e) => tracing::warn!(
                executable = %self.executable.display(),
                error = %e,
                "Failed to wait for CGI child"
            ),
        }
    }
}

/// Copy the request body into stdin, then close it.
async fn feed_stdin(mut stdin: ChildStdin, body: Body) -> io::Result<()> {
    let mut chunks = body.into_data_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(io::Error::other)?;
        stdin.write_all(&chunk).await?;
    }
    stdin.shutdown().await
}
