//! CGI response parsing.
//!
//! # Responsibilities
//! - Read the header block from child stdout, up to the blank line
//! - Interpret the `Status` and `Location` headers
//! - Turn headers plus the streamed body into an HTTP response
//!
//! # Design Decisions
//! - Lines may end in `\n` or `\r\n`
//! - Unparseable header lines are skipped, not fatal
//! - Output that ends before the blank line has no usable headers
//! - The header block is bounded; the body is never buffered here

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::cgi::CgiError;

/// Largest header block accepted from a child.
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Status line and headers of a CGI response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiHead {
    pub status: StatusCode,
    /// Headers in the order the child wrote them (`Status` excluded).
    pub headers: Vec<(String, String)>,
}

impl CgiHead {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A CGI response whose body is still streaming from the child.
#[derive(Debug)]
pub struct CgiResponse {
    pub head: CgiHead,
    pub body: Body,
}

/// Read and interpret the header block, leaving `reader` at the first body byte.
pub async fn read_head<R>(reader: &mut R) -> Result<CgiHead, CgiError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Vec::new();
    let mut status = None;
    let mut total = 0;
    let mut line = Vec::new();

    loop {
        line.clear();
        let limit = MAX_HEADER_BYTES - total;
        let n = (&mut *reader)
            .take(limit as u64)
            .read_until(b'\n', &mut line)
            .await?;
        if n == 0 {
            return Err(if limit == 0 {
                CgiError::HeadersTooLarge
            } else {
                CgiError::NoHeaders
            });
        }
        total += n;

        let trimmed = line.strip_suffix(b"\n").unwrap_or(&line);
        let trimmed = trimmed.strip_suffix(b"\r").unwrap_or(trimmed);
        if trimmed.is_empty() {
            break;
        }

        let text = String::from_utf8_lossy(trimmed);
        let Some((name, value)) = text.split_once(':') else {
            tracing::warn!(line = %text, "Ignoring bogus CGI header line");
            continue;
        };
        let (name, value) = (name.trim(), value.trim());

        if name.eq_ignore_ascii_case("Status") {
            status = Some(parse_status(value)?);
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    if headers.is_empty() && status.is_none() {
        return Err(CgiError::NoHeaders);
    }

    let has = |wanted: &HeaderName| {
        headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(wanted.as_str()))
    };
    let status = match status {
        Some(status) => status,
        None if has(&LOCATION) => StatusCode::FOUND,
        None if has(&CONTENT_TYPE) => StatusCode::OK,
        None => return Err(CgiError::MissingContentType),
    };

    Ok(CgiHead { status, headers })
}

/// `Status: 404 Not Found` → 404. Only the first three characters count.
fn parse_status(value: &str) -> Result<StatusCode, CgiError> {
    value
        .get(..3)
        .and_then(|code| code.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| CgiError::BadStatus(value.to_string()))
}

impl IntoResponse for CgiResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.head.status;

        let response_headers = response.headers_mut();
        for (name, value) in self.head.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    response_headers.append(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid CGI response header"),
            }
        }
        response
    }
}
