use metrics::{counter, histogram};
use std::time::Instant;

/// Increment a counter for newly listed cars.
pub fn increment_car_listed() {
    counter!("cars_listed_total").increment(1);
}

/// Increment a counter for booked rentals.
pub fn increment_rental_booked() {
    counter!("rentals_booked_total").increment(1);
}

/// Count like toggles, labelled by the resulting state.
pub fn increment_like_toggled(liked: bool) {
    let state = if liked { "liked" } else { "unliked" };
    counter!("likes_toggled_total", "state" => state).increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
