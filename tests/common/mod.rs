//! Shared utilities for integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use cgiserve::routing::discover_executables;
use cgiserve::{CgiHandler, ChildEnvironmentPolicy, HttpServer, RoutingTable};

/// Write an executable `/bin/sh` script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A script that answers with `ran <name>` and the path it was asked for.
pub fn write_named_script(dir: &Path, name: &str) -> PathBuf {
    write_script(
        dir,
        name,
        &format!(
            "printf 'Content-Type: text/plain\\n\\n'\nprintf 'ran {} %s\\n' \"$PATH_INFO\"\n",
            name
        ),
    )
}

/// A script that dumps its environment.
#[allow(dead_code)]
pub fn write_env_script(dir: &Path, name: &str) -> PathBuf {
    write_script(dir, name, "printf 'Content-Type: text/plain\\n\\n'\nenv\n")
}

/// Build the router the way startup does.
#[allow(dead_code)]
pub fn app(dir: &Path, wildcard: bool, policy: ChildEnvironmentPolicy) -> Router {
    let executables = discover_executables(dir).unwrap();
    let table = RoutingTable::build(executables, wildcard);
    HttpServer::new(table, CgiHandler::new(policy)).router()
}

/// Send one request through `app` in-process.
#[allow(dead_code)]
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

/// GET `uri` through `app`.
#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

/// Variables a child may see regardless of policy: CGI ones, `PATH`, and
/// what the shell itself exports.
#[allow(dead_code)]
pub fn is_intrinsic(key: &str) -> bool {
    const EXACT: &[&str] = &[
        "PATH",
        "LD_LIBRARY_PATH",
        "PWD",
        "OLDPWD",
        "SHLVL",
        "_",
        "PATH_INFO",
        "QUERY_STRING",
        "GATEWAY_INTERFACE",
    ];
    const PREFIXES: &[&str] = &["HTTP_", "SERVER_", "REQUEST_", "REMOTE_", "CONTENT_", "SCRIPT_"];

    EXACT.contains(&key) || PREFIXES.iter().any(|p| key.starts_with(p))
}
