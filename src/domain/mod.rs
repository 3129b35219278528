mod metrics;
mod models;
mod pricing;
mod repository;
mod sessions;
mod validation;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Persistence and session abstractions
pub use repository::{DuplicateField, Repository, RepositoryPtr};
pub use sessions::{SessionInfo, SessionStore, SessionStorePtr};

// Marketplace records and the rules that derive from them
pub use models::{Car, CarAttributes, CarFilter, NewUser, Rental, Transmission, User};
pub use pricing::{billable_days, rental_total};
pub use validation::{
    BookingDates, CarFilterQuery, CarForm, LoginForm, RegisterForm, Registration, RentalForm,
    ValidationErrors,
};
