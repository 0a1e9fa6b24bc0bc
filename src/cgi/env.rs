//! CGI environment construction.
//!
//! # Responsibilities
//! - Translate request metadata into the standard CGI variables
//! - Export request headers as `HTTP_*` variables
//! - Layer `PATH`, inherited library paths and the child policy on top
//!
//! # Design Decisions
//! - The child starts from an empty environment; nothing leaks implicitly
//! - Later sources override earlier ones, so the policy has the last word
//! - The `Proxy` header is never exported (`HTTP_PROXY` would be honoured
//!   as a proxy setting by many CGI programs)

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::Path;

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HOST};
use axum::http::request::Parts;
use axum::http::uri::Authority;

use crate::config::ChildEnvironmentPolicy;

/// `PATH` given to children when the server itself has none.
const DEFAULT_PATH: &str = "/bin:/usr/bin:/usr/ucb:/usr/bsd:/usr/local/bin";

/// Server variables passed through to children whenever they are set.
const INHERITED_VARS: &[&str] = &["LD_LIBRARY_PATH"];

/// Environment for one CGI invocation, keyed by variable name.
pub type CgiEnv = BTreeMap<OsString, OsString>;

/// Everything about the request the environment is built from.
#[derive(Debug)]
pub struct CgiRequest<'a> {
    pub parts: &'a Parts,
    /// Decoded request path.
    pub path_info: &'a str,
    pub script: &'a Path,
    pub remote_addr: Option<SocketAddr>,
}

/// Build the full child environment for `request` under `policy`.
pub fn build_env(request: &CgiRequest<'_>, policy: &ChildEnvironmentPolicy) -> CgiEnv {
    let mut env = CgiEnv::new();
    let mut set = |key: &str, value: String| {
        env.insert(OsString::from(key), OsString::from(value));
    };

    let parts = request.parts;
    let host = parts
        .headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default();
    let (server_name, server_port) = split_host(&host);

    set("SERVER_SOFTWARE", concat!("cgiserve/", env!("CARGO_PKG_VERSION")).to_string());
    set("SERVER_NAME", server_name);
    set("SERVER_PROTOCOL", format!("{:?}", parts.version));
    set("SERVER_PORT", server_port);
    set("HTTP_HOST", host);
    set("GATEWAY_INTERFACE", "CGI/1.1".to_string());
    set("REQUEST_METHOD", parts.method.to_string());
    set("QUERY_STRING", parts.uri.query().unwrap_or_default().to_string());
    set(
        "REQUEST_URI",
        parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string()),
    );
    set("PATH_INFO", request.path_info.to_string());
    set("SCRIPT_NAME", "/".to_string());
    set("SCRIPT_FILENAME", request.script.display().to_string());

    if let Some(remote) = request.remote_addr {
        set("REMOTE_ADDR", remote.ip().to_string());
        set("REMOTE_HOST", remote.ip().to_string());
        set("REMOTE_PORT", remote.port().to_string());
    }

    for name in parts.headers.keys() {
        let key = name.as_str().to_ascii_uppercase().replace('-', "_");
        if key == "PROXY" {
            continue;
        }
        let separator = if *name == COOKIE { "; " } else { ", " };
        let joined = parts
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(separator);
        set(&format!("HTTP_{}", key), joined);
    }

    let content_length = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);
    if content_length > 0 {
        set("CONTENT_LENGTH", content_length.to_string());
    }
    if let Some(content_type) = parts.headers.get(CONTENT_TYPE) {
        set(
            "CONTENT_TYPE",
            String::from_utf8_lossy(content_type.as_bytes()).into_owned(),
        );
    }

    let path = std::env::var_os("PATH")
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| OsString::from(DEFAULT_PATH));
    env.insert(OsString::from("PATH"), path);

    for name in INHERITED_VARS {
        if let Some(value) = std::env::var_os(name).filter(|v| !v.is_empty()) {
            env.insert(OsString::from(name), value);
        }
    }

    env.extend(policy.vars());
    env
}

/// Split a Host value into `SERVER_NAME` and `SERVER_PORT`.
fn split_host(host: &str) -> (String, String) {
    match host.parse::<Authority>() {
        Ok(authority) => {
            let name = authority
                .host()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_string();
            let port = authority
                .port_u16()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "80".to_string());
            (name, port)
        }
        Err(_) => (host.to_string(), "80".to_string()),
    }
}
