//! Access log format module
//!
//! Supports multiple log formats:
//! - `common` (Common Log Format - CLF, plus the served content type)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;
use serde_json::json;

/// Access log entry for one served error response
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address (usually the ingress proxy)
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, HEAD, ...)
    pub method: String,
    /// Request URI path and query
    pub uri: String,
    /// HTTP version (1.0, 1.1)
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Response `Content-Type`
    pub content_type: Option<String>,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// `X-Original-URI` set by the proxy
    pub original_uri: Option<String>,
    /// `X-Request-ID` set by the proxy
    pub request_id: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, uri: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            uri,
            http_version: "1.1".to_string(),
            status: 200,
            content_type: None,
            body_bytes: 0,
            original_uri: None,
            request_id: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// Common Log Format (CLF) followed by content type and original URI
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$content_type" "$original_uri"`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {} \"{}\" \"{}\"",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.uri,
            self.http_version,
            self.status,
            self.body_bytes,
            self.content_type.as_deref().unwrap_or("-"),
            self.original_uri.as_deref().unwrap_or("-"),
        )
    }

    /// JSON structured log format
    fn format_json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "uri": self.uri,
            "http_version": self.http_version,
            "status": self.status,
            "content_type": self.content_type,
            "body_bytes": self.body_bytes,
            "original_uri": self.original_uri,
            "request_id": self.request_id,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client IP address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request` - Full request line ("METHOD /path HTTP/version")
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request URI
    /// - `$request_id` - `X-Request-ID` header
    /// - `$original_uri` - `X-Original-URI` header
    /// - `$status` - Response status code
    /// - `$content_type` - Response content type
    /// - `$body_bytes_sent` - Response body size
    /// - `$request_time` - Request processing time in seconds (3 decimal places)
    fn format_custom(&self, pattern: &str) -> String {
        let request_line = format!("{} {} HTTP/{}", self.method, self.uri, self.http_version);
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // Longer variables first: `$request_time`, `$request_id` and friends
        // must be replaced before `$request`.
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace(
                "$time_local",
                &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            )
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.uri)
            .replace("$request_id", self.request_id.as_deref().unwrap_or("-"))
            .replace("$request", &request_line)
            .replace("$original_uri", self.original_uri.as_deref().unwrap_or("-"))
            .replace("$status", &self.status.to_string())
            .replace("$content_type", self.content_type.as_deref().unwrap_or("-"))
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
    }
}
