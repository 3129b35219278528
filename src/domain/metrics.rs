use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a "car listed" event.
    fn record_car_listed(&self);

    /// Record a booked rental.
    fn record_rental_booked(&self);

    /// Record a like toggle; `liked` is the resulting state.
    fn record_like_toggled(&self, liked: bool);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
