//! HTTP response building module
//!
//! Provides builders for the responses the error page server emits, decoupled
//! from how the status and body were chosen.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

/// Body of the generic fallback when no error document matches
pub const NOT_FOUND_BODY: &str = "404 page not found\n";

/// Build an error page response
///
/// `echo` headers are applied first and `content_type` last, so the
/// negotiated type always wins over an echoed `Content-Type`.
pub fn build_error_page_response(
    status: StatusCode,
    content_type: HeaderValue,
    echo: &HeaderMap,
    body: Bytes,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    let mut response = Response::builder()
        .status(status)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            empty_response(status)
        });

    let headers = response.headers_mut();
    for (name, value) in echo {
        headers.insert(name.clone(), value.clone());
    }
    headers.insert(CONTENT_TYPE, content_type);

    response
}

/// Build the generic not-found fallback
///
/// Keeps the requested status; only the body is generic.
pub fn build_not_found_fallback(
    status: StatusCode,
    content_type: HeaderValue,
    echo: &HeaderMap,
    is_head: bool,
) -> Response<Full<Bytes>> {
    build_error_page_response(
        status,
        content_type,
        echo,
        Bytes::from_static(NOT_FOUND_BODY.as_bytes()),
        is_head,
    )
}

/// Build health check response (liveness/readiness probes)
pub fn build_health_response(status_text: &'static str, is_head: bool) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(status_text.as_bytes())
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, status_text.len())
        .header("Cache-Control", "no-cache, no-store")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::OK, &e);
            empty_response(StatusCode::OK)
        })
}

/// Build the Prometheus scrape response
pub fn build_metrics_response(body: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(body) };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; version=0.0.4")
        .header(CONTENT_LENGTH, content_length)
        .header("Cache-Control", "no-cache, no-store")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::OK, &e);
            empty_response(StatusCode::OK)
        })
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!(
        "Failed to build {} response: {error}",
        status.as_u16()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response
            .into_body()
            .collect()
            .await
            .expect("full body is infallible")
            .to_bytes()
    }

    #[tokio::test]
    async fn test_error_page_response() {
        let response = build_error_page_response(
            StatusCode::SERVICE_UNAVAILABLE,
            HeaderValue::from_static("application/json"),
            &HeaderMap::new(),
            Bytes::from_static(b"{\"error\":503}"),
            false,
        );

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[CONTENT_LENGTH], "13");
        assert_eq!(body_bytes(response).await, "{\"error\":503}");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let response = build_error_page_response(
            StatusCode::NOT_FOUND,
            HeaderValue::from_static("text/html"),
            &HeaderMap::new(),
            Bytes::from_static(b"<h1>404</h1>"),
            true,
        );

        assert_eq!(response.headers()[CONTENT_LENGTH], "12");
        assert!(body_bytes(response).await.is_empty());
    }

    #[test]
    fn test_negotiated_content_type_wins_over_echo() {
        let mut echo = HeaderMap::new();
        echo.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        echo.insert("x-code", HeaderValue::from_static("404"));

        let response = build_error_page_response(
            StatusCode::NOT_FOUND,
            HeaderValue::from_static("text/html"),
            &echo,
            Bytes::new(),
            false,
        );

        assert_eq!(response.headers().get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert_eq!(response.headers()["x-code"], "404");
    }

    #[tokio::test]
    async fn test_not_found_fallback_keeps_status() {
        let response = build_not_found_fallback(
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderValue::from_static("text/html"),
            &HeaderMap::new(),
            false,
        );

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert_eq!(body_bytes(response).await, NOT_FOUND_BODY);
    }

    #[test]
    fn test_health_response() {
        let response = build_health_response("ok", false);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[tokio::test]
    async fn test_metrics_response() {
        let response = build_metrics_response("http_requests_total 1\n".to_string(), false);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; version=0.0.4");
        assert_eq!(response.headers()[CONTENT_LENGTH], "22");
        assert_eq!(body_bytes(response).await, "http_requests_total 1\n");
    }
}
