use crate::domain::{Car, User};

/// Only the owner of a car may update or delete it.
pub fn authorize_owner(car: &Car, user: &User) -> bool {
    car.owner_id == user.id
}
