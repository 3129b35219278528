//! Prometheus metrics implementation.
//!
//! This module provides a concrete implementation of the `Metrics` trait using
//! the Prometheus metrics format. It delegates to utility functions in sibling
//! modules (`counters.rs`, `recorder.rs`) which handle the actual metrics
//! collection via the global `metrics` crate registry.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Empty because all series live in the global `metrics` registry; the
/// recorder handle in `recorder.rs` renders them.
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_car_listed(&self) {
        tracing::debug!("Recording car listed event");
        super::increment_car_listed();
    }

    fn record_rental_booked(&self) {
        tracing::debug!("Recording rental booked event");
        super::increment_rental_booked();
    }

    fn record_like_toggled(&self, liked: bool) {
        super::increment_like_toggled(liked);
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
