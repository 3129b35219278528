use super::models::{Car, CarAttributes, CarFilter, NewUser, Rental, User};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Raised through `anyhow` when an insert hits a unique constraint.
///
/// Callers recover it with `err.downcast_ref::<DuplicateField>()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} is already taken")]
pub struct DuplicateField {
    pub field: &'static str,
}

/// Abstraction over the marketplace's persistent store.
///
/// Every method is a single unit of work; implementations guarantee atomicity
/// per call and nothing across calls.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Cheap connectivity check used by the full health probe.
    async fn ping(&self) -> Result<()>;

    // -- Identity store ------------------------------------------------------

    /// Insert a user. Fails with [`DuplicateField`] on a taken phone number or email.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn get_user_by_phone(&self, phone_number: &str) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    // -- Catalog -------------------------------------------------------------

    async fn create_car(&self, car: Car) -> Result<Car>;

    async fn get_car(&self, car_id: Uuid) -> Result<Option<Car>>;

    /// Replace a car's listing attributes. The owner is never changed.
    async fn update_car(&self, car_id: Uuid, attributes: CarAttributes) -> Result<Option<Car>>;

    /// Delete a car together with its rentals and likes. Returns false if absent.
    async fn delete_car(&self, car_id: Uuid) -> Result<bool>;

    /// Cars matching every set filter, oldest listing first.
    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>>;

    async fn list_cars_by_owner(&self, owner_id: Uuid) -> Result<Vec<Car>>;

    /// Up to `limit` cars with their like counts, most liked first.
    async fn most_liked_cars(&self, limit: usize) -> Result<Vec<(Car, i64)>>;

    // -- Favorites ledger ----------------------------------------------------

    /// Flip the like edge between a user and a car; returns the new state.
    async fn toggle_like(&self, user_id: Uuid, car_id: Uuid) -> Result<bool>;

    async fn liked_cars(&self, user_id: Uuid) -> Result<Vec<Car>>;

    async fn liked_by(&self, car_id: Uuid) -> Result<Vec<Uuid>>;

    // -- Rental ledger -------------------------------------------------------

    async fn create_rental(&self, rental: Rental) -> Result<Rental>;

    /// Rentals of one renter, latest start date first.
    async fn rentals_for_renter(&self, renter_id: Uuid) -> Result<Vec<Rental>>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
