//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatch handler
//! - Wire up middleware (request ID, tracing)
//! - Serve on a bound listener until shutdown
//! - Dispatch each request: decode → clean path → route lookup → CGI invocation

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::cgi::CgiHandler;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::routing::path::{clean_path, decode_path, encode_path};
use crate::routing::RoutingTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RoutingTable>,
    pub cgi: Arc<CgiHandler>,
}

/// HTTP front end for the CGI routing table.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server answering from `table` and running children via `cgi`.
    pub fn new(table: RoutingTable, cgi: CgiHandler) -> Self {
        let state = AppState {
            table: Arc::new(table),
            cgi: Arc::new(cgi),
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        // Every path, including malformed ones, goes through the dispatcher.
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Per-request entry point.
///
/// Exact match first, then the wildcard if one is registered, otherwise 404.
/// No process is spawned for a request that does not resolve.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();
    let raw_path = request.uri().path().to_string();

    let path = match decode_path(&raw_path) {
        Ok(path) => path.into_owned(),
        Err(_) => {
            tracing::debug!(request_id = %request_id, path = %raw_path, "Undecodable request path");
            return (StatusCode::BAD_REQUEST, "400 Bad Request").into_response();
        }
    };

    // Dot segments count after decoding, so `%2e%2e` cannot slip past.
    let cleaned = clean_path(&path);
    if cleaned != path {
        let encoded = encode_path(&cleaned);
        let location = match request.uri().query() {
            Some(query) => format!("{}?{}", encoded, query),
            None => encoded,
        };
        tracing::debug!(request_id = %request_id, path = %raw_path, location = %location, "Redirecting to clean path");
        return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
    }

    let Some(route) = state.table.resolve(&path) else {
        tracing::debug!(request_id = %request_id, path = %path, "No route matched");
        return (StatusCode::NOT_FOUND, "404 page not found\n").into_response();
    };

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    tracing::debug!(
        request_id = %request_id,
        path = %path,
        resource = %route.resource_path(),
        kind = ?route.kind(),
        executable = %route.executable().path().display(),
        "Dispatching request"
    );

    match state
        .cgi
        .serve(route.executable(), &path, remote_addr, request)
        .await
    {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                executable = %route.executable().path().display(),
                error = %e,
                "CGI error"
            );
            e.into_response()
        }
    }
}
