//! HTTP server setup and forwarding.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID, optional Basic auth)
//! - Forward requests to the configured upstream
//! - Route eligible multi-status responses through the rewriter
//! - Observability (metrics, correlation IDs)

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, StatusCode, Uri,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::config::{ProxyConfig, RewriteConfig};
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response;
use crate::observability::metrics;
use crate::rewrite;
use crate::security::basic_auth::require_basic_auth;

/// Upstream scheme and authority, resolved once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
}

/// The configured upstream URL could not be turned into a request target.
#[derive(Debug, Error)]
#[error("invalid upstream url {url:?}: {reason}")]
pub struct UpstreamUrlError {
    url: String,
    reason: String,
}

impl UpstreamTarget {
    /// Resolve a base URL into the parts forwarded requests are built from.
    /// Any path on the URL is ignored; the inbound path replaces it.
    pub fn from_url(raw: &str) -> Result<Self, UpstreamUrlError> {
        let invalid = |reason: &str| UpstreamUrlError {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: Scheme::try_from(url.scheme()).map_err(|_| invalid("unsupported scheme"))?,
            authority: Authority::try_from(authority.as_str())
                .map_err(|e| invalid(&e.to_string()))?,
        })
    }

    /// Host value forwarded requests carry.
    pub fn authority_str(&self) -> &str {
        self.authority.as_str()
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: UpstreamTarget,
    pub rewrite_config: RewriteConfig,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamUrlError> {
        let upstream = UpstreamTarget::from_url(&config.upstream.url)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            client,
            upstream,
            rewrite_config: config.rewrite.clone(),
        };

        Ok(Self {
            router: Self::build_router(&config, state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state);

        // The auth gate only exists when both credentials are configured.
        if config.auth.credentials().is_some() {
            router = router.layer(middleware::from_fn_with_state(
                config.auth.clone(),
                require_basic_auth,
            ));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: forward to the upstream, rewrite eligible bodies.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().clone();
    let method_str = method.to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    let (mut parts, body) = request.into_parts();

    // Target URI: upstream scheme+authority, inbound path+query.
    let path_and_query = parts
        .uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));
    let mut uri_parts = axum::http::uri::Parts::default();
    uri_parts.scheme = Some(state.upstream.scheme.clone());
    uri_parts.authority = Some(state.upstream.authority.clone());
    uri_parts.path_and_query = Some(path_and_query);
    let uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Invalid request target");
            metrics::record_request(&method_str, 400, start_time);
            return (StatusCode::BAD_REQUEST, "Invalid request target").into_response();
        }
    };

    // The upstream routes on Host, not on whatever name the client used.
    if let Ok(host) = HeaderValue::from_str(state.upstream.authority_str()) {
        parts.headers.insert(header::HOST, host);
    }

    let mut upstream_request = Request::from_parts(parts, body);
    *upstream_request.uri_mut() = uri;

    match state.client.request(upstream_request).await {
        Ok(upstream_response) => {
            let status = upstream_response.status();
            let content_type = upstream_response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            if rewrite::should_rewrite(&method, content_type.as_deref(), status) {
                let (resp_parts, resp_body) = upstream_response.into_parts();
                let bytes = match axum::body::to_bytes(
                    Body::new(resp_body),
                    state.rewrite_config.max_buffer_bytes,
                )
                .await
                {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        // The stream is consumed; there is nothing valid
                        // left to forward.
                        tracing::error!(
                            request_id = %request_id,
                            error = %e,
                            "Failed to buffer multi-status body"
                        );
                        metrics::record_request(&method_str, 502, start_time);
                        return (StatusCode::BAD_GATEWAY, "Upstream response unreadable")
                            .into_response();
                    }
                };

                let text = String::from_utf8_lossy(&bytes);
                let rewritten = rewrite::rewrite_document(&text);
                if matches!(rewritten, std::borrow::Cow::Owned(_)) {
                    metrics::record_rewrite();
                }
                tracing::debug!(
                    request_id = %request_id,
                    bytes = bytes.len(),
                    "Rewrote multi-status response"
                );

                metrics::record_request(&method_str, status.as_u16(), start_time);
                return response::with_rewritten_body(resp_parts, rewritten.into_owned())
                    .into_response();
            }

            metrics::record_request(&method_str, status.as_u16(), start_time);
            let (mut resp_parts, resp_body) = upstream_response.into_parts();
            response::strip_hop_by_hop(&mut resp_parts.headers);
            Response::from_parts(resp_parts, Body::new(resp_body)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_request(&method_str, 502, start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_target_keeps_explicit_port() {
        let target = UpstreamTarget::from_url("http://127.0.0.1:9999").unwrap();
        assert_eq!(target.authority_str(), "127.0.0.1:9999");
    }

    #[test]
    fn test_upstream_target_path_is_ignored() {
        let target = UpstreamTarget::from_url("http://indexer.local/dav/base").unwrap();
        assert_eq!(target.authority_str(), "indexer.local");
    }

    #[test]
    fn test_upstream_target_rejects_garbage() {
        assert!(UpstreamTarget::from_url("not a url").is_err());
        assert!(UpstreamTarget::from_url("unix:/tmp/sock").is_err());
    }
}
