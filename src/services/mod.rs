// Operations of the marketplace components. Each takes the repository and an
// explicit acting user where one is needed; none of them touch HTTP types.

pub mod access;
pub mod catalog;
mod error;
pub mod favorites;
pub mod identity;
mod password;
pub mod profile;
pub mod rentals;

pub use error::{ServiceError, ServiceResult};
