// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod cars;
mod current_user;
mod health;
mod home;
mod likes;
mod metrics;
mod profile;
mod rentals;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_requests};

// Identity and session handlers
pub use auth::{login, logout, register};
pub use profile::profile;

// Catalog, favorites and rentals
pub use cars::{create_car, delete_car, get_car, update_car};
pub use home::home;
pub use likes::toggle_like;
pub use rentals::rent_car;
