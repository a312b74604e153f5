//! Metrics and observability utilities
//!
//! Prometheus-style metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all BlogForge metrics
pub const METRICS_PREFIX: &str = "blogforge";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Ingestion metrics
    describe_counter!(
        format!("{}_posts_ingested_total", METRICS_PREFIX),
        Unit::Count,
        "Total blog posts stored"
    );

    describe_counter!(
        format!("{}_content_blocks_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total content blocks created"
    );

    describe_counter!(
        format!("{}_images_stored_total", METRICS_PREFIX),
        Unit::Count,
        "Total image payloads stored"
    );

    describe_counter!(
        format!("{}_images_degraded_total", METRICS_PREFIX),
        Unit::Count,
        "Image blocks stored without a payload"
    );

    describe_histogram!(
        format!("{}_ingestion_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Document ingestion latency in seconds"
    );

    // Read metrics
    describe_counter!(
        format!("{}_image_bytes_served_total", METRICS_PREFIX),
        Unit::Bytes,
        "Raw image bytes served"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a committed post
pub fn record_post_stored(blocks: usize, images: usize, degraded: usize) {
    counter!(format!("{}_posts_ingested_total", METRICS_PREFIX)).increment(1);

    counter!(format!("{}_content_blocks_created_total", METRICS_PREFIX))
        .increment(blocks as u64);

    counter!(format!("{}_images_stored_total", METRICS_PREFIX)).increment(images as u64);

    if degraded > 0 {
        counter!(format!("{}_images_degraded_total", METRICS_PREFIX))
            .increment(degraded as u64);
    }
}

/// Record end-to-end ingestion latency
pub fn record_ingestion(duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    histogram!(
        format!("{}_ingestion_duration_seconds", METRICS_PREFIX),
        "status" => status
    )
    .record(duration_secs);
}

/// Record raw image bytes sent to a client
pub fn record_image_served(bytes: usize) {
    counter!(format!("{}_image_bytes_served_total", METRICS_PREFIX)).increment(bytes as u64);
}
