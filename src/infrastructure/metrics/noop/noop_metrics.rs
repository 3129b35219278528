use crate::domain::Metrics;
use std::time::Instant;

/// No-op metrics implementation for testing.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_car_listed(&self) {}
    fn record_rental_booked(&self) {}
    fn record_like_toggled(&self, _: bool) {}
    fn record_http_request(&self, _: Instant, _: &str, _: &str, _: u16) {}
}
