//! Request metrics in Prometheus text format
//!
//! Every error page request bumps `http_requests_total` and records its
//! latency in `http_requests_duration_seconds`, labelled by status and format.
//! The recorder is owned by the application state instead of being installed
//! globally, so independent servers (and tests) keep separate counters.

use hyper::StatusCode;
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use std::time::Duration;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_requests_duration_seconds";

const EXPONENTIAL_SECONDS: &[f64] = &[
    0.000_5, 0.001, 0.002_5, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

pub struct RequestMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl RequestMetrics {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                EXPONENTIAL_SECONDS,
            )?
            .build_recorder();
        let handle = recorder.handle();
        Ok(Self { recorder, handle })
    }

    /// Record one served error page
    pub fn record(&self, status: StatusCode, format: &str, elapsed: Duration) {
        let labels = [
            ("status", status.as_u16().to_string()),
            ("format", format.to_string()),
        ];

        metrics::with_local_recorder(&self.recorder, || {
            metrics::counter!(REQUESTS_TOTAL, &labels).increment(1);
            metrics::histogram!(REQUEST_DURATION_SECONDS, &labels).record(elapsed.as_secs_f64());
        });
    }

    /// Current snapshot in the Prometheus exposition format
    pub fn render(&self) -> String {
        self.handle.run_upkeep();
        self.handle.render()
    }
}
