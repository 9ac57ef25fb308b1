//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health probes and the metrics
//! scrape are answered directly, every other request is an error page request.

use crate::config::{AppState, HealthConfig, MetricsConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::responder::{ORIGINAL_URI_HEADER, REQUEST_ID_HEADER};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Never fails: every request ends in a written response.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let is_head = req.method() == Method::HEAD;

    let path = req.uri().path();
    let routes = &state.config.routes;

    let response = if let Some(status_text) = health_probe(path, &routes.health) {
        http::build_health_response(status_text, is_head)
    } else if is_metrics_scrape(path, &routes.metrics) {
        http::build_metrics_response(state.metrics.render(), is_head)
    } else {
        let served = state.responder.serve(req.headers(), is_head).await;
        state
            .metrics
            .record(served.status, &served.format, started.elapsed());
        served.response
    };

    if state.config.logging.access_log {
        let entry = access_log_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Match liveness/readiness paths
fn health_probe(path: &str, health: &HealthConfig) -> Option<&'static str> {
    if !health.enabled {
        return None;
    }
    if path == health.liveness_path || path == health.readiness_path {
        return Some("ok");
    }
    None
}

fn is_metrics_scrape(path: &str, metrics: &MetricsConfig) -> bool {
    metrics.enabled && path == metrics.path
}

fn access_log_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let uri = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), req.method().to_string(), uri);
    entry.http_version = http_version(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.content_type = header_string(response.headers(), &CONTENT_TYPE);
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.original_uri = header_string(req.headers(), &ORIGINAL_URI_HEADER);
    entry.request_id = header_string(req.headers(), &REQUEST_ID_HEADER);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

const fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_state(root: &std::path::Path) -> Arc<AppState> {
        let env = [(
            "ERROR_FILES_PATH".to_string(),
            root.to_string_lossy().into_owned(),
        )]
        .into_iter()
        .collect();
        let mut config = Config::load_with_env(&root.join("absent").to_string_lossy(), env).unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::new(config).unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_health_probes() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        for path in ["/healthz", "/readyz"] {
            let req = Request::get(path).body(()).unwrap();
            let response = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(body, "ok");
        }
    }

    #[tokio::test]
    async fn test_other_paths_reach_responder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("5xx.html"), "upstream down").unwrap();
        let state = test_state(dir.path());

        let req = Request::post("/any/path?x=1")
            .header("X-Code", "502")
            .body(())
            .unwrap();
        let response = handle_request(req, state, peer()).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "upstream down");
    }

    #[tokio::test]
    async fn test_health_disabled_falls_to_responder() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = Arc::try_unwrap(test_state(dir.path())).ok().unwrap();
        state.config.routes.health.enabled = false;

        let req = Request::get("/healthz").body(()).unwrap();
        let response = handle_request(req, Arc::new(state), peer()).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn get_body(state: &Arc<AppState>, path: &str) -> (StatusCode, String) {
        let req = Request::get(path).body(()).unwrap();
        let response = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_count_error_pages_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("404.html"), "missing").unwrap();
        let state = test_state(dir.path());

        let req = Request::get("/")
            .header("X-Code", "404")
            .header("X-Format", "text/html")
            .body(())
            .unwrap();
        handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        get_body(&state, "/healthz").await;

        let (status, body) = get_body(&state, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        let requests: Vec<&str> = body
            .lines()
            .filter(|line| line.starts_with("http_requests_total{"))
            .collect();
        assert_eq!(requests.len(), 1, "{body}");
        assert!(requests[0].contains(r#"status="404""#));
        assert!(requests[0].contains(r#"format="html""#));
        assert!(requests[0].ends_with(" 1"));
    }

    #[tokio::test]
    async fn test_metrics_disabled_falls_to_responder() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = Arc::try_unwrap(test_state(dir.path())).ok().unwrap();
        state.config.routes.metrics.enabled = false;
        let state = Arc::new(state);

        let (status, body) = get_body(&state, "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, http::NOT_FOUND_BODY);
    }

    #[test]
    fn test_access_log_entry() {
        let req = Request::head("/?q=1")
            .header("X-Original-URI", "/shop/cart")
            .header("X-Request-ID", "req-9")
            .body(())
            .unwrap();
        let response = http::build_health_response("ok", true);

        let entry = access_log_entry(&req, &response, peer(), Instant::now());

        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.method, "HEAD");
        assert_eq!(entry.uri, "/?q=1");
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body_bytes, 2);
        assert_eq!(entry.content_type.as_deref(), Some("text/plain"));
        assert_eq!(entry.original_uri.as_deref(), Some("/shop/cart"));
        assert_eq!(entry.request_id.as_deref(), Some("req-9"));
    }
}
