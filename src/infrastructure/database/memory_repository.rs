//! In-process repository used for local runs and the HTTP test suite.
//!
//! All tables live behind one `RwLock`, so every trait call is atomic.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    Car, CarAttributes, CarFilter, DuplicateField, NewUser, Rental, Repository, RepositoryPtr,
    User,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    cars: HashMap<Uuid, Car>,
    likes: BTreeSet<(Uuid, Uuid)>, // (user_id, car_id)
    rentals: HashMap<Uuid, Rental>,
}

impl Tables {
    // ---
    fn sorted_cars<'a>(&self, cars: impl Iterator<Item = &'a Car>) -> Vec<Car> {
        // ---
        let mut cars: Vec<Car> = cars.cloned().collect();
        cars.sort_by(|a, b| a.listed_at.cmp(&b.listed_at).then(a.id.cmp(&b.id)));
        cars
    }

    fn like_count(&self, car_id: Uuid) -> i64 {
        // ---
        self.likes.iter().filter(|(_, c)| *c == car_id).count() as i64
    }
}

fn newest_first(mut rentals: Vec<Rental>) -> Vec<Rental> {
    // ---
    rentals.sort_by(|a, b| {
        b.start_date
            .cmp(&a.start_date)
            .then(b.booked_at.cmp(&a.booked_at))
    });
    rentals
}

pub fn create_memory_repository() -> RepositoryPtr {
    // ---
    Arc::new(MemoryRepository::default())
}

#[derive(Default)]
pub struct MemoryRepository {
    // ---
    tables: RwLock<Tables>,
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        // ---
        let mut t = self.tables.write().await;

        if t.users
            .values()
            .any(|u| u.phone_number == new_user.phone_number)
        {
            return Err(DuplicateField {
                field: "phone_number",
            }
            .into());
        }
        if t.users.values().any(|u| u.email == new_user.email) {
            return Err(DuplicateField { field: "email" }.into());
        }

        let user = new_user.into_user();
        t.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn get_user_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        // ---
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        // ---
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        // ---
        if let Some(user) = self.tables.write().await.users.get_mut(&user_id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn create_car(&self, car: Car) -> Result<Car> {
        // ---
        let mut t = self.tables.write().await;
        anyhow::ensure!(
            t.users.contains_key(&car.owner_id),
            "owner {} does not exist",
            car.owner_id
        );
        t.cars.insert(car.id, car.clone());
        Ok(car)
    }

    async fn get_car(&self, car_id: Uuid) -> Result<Option<Car>> {
        Ok(self.tables.read().await.cars.get(&car_id).cloned())
    }

    async fn update_car(&self, car_id: Uuid, attributes: CarAttributes) -> Result<Option<Car>> {
        // ---
        let mut t = self.tables.write().await;
        Ok(t.cars.get_mut(&car_id).map(|car| {
            car.attributes = attributes;
            car.clone()
        }))
    }

    async fn delete_car(&self, car_id: Uuid) -> Result<bool> {
        // ---
        let mut t = self.tables.write().await;
        if t.cars.remove(&car_id).is_none() {
            return Ok(false);
        }
        t.likes.retain(|(_, c)| *c != car_id);
        t.rentals.retain(|_, r| r.car_id != car_id);
        Ok(true)
    }

    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>> {
        // ---
        let t = self.tables.read().await;
        Ok(t.sorted_cars(t.cars.values().filter(|c| c.matches(filter))))
    }

    async fn list_cars_by_owner(&self, owner_id: Uuid) -> Result<Vec<Car>> {
        // ---
        let t = self.tables.read().await;
        Ok(t.sorted_cars(t.cars.values().filter(|c| c.owner_id == owner_id)))
    }

    async fn most_liked_cars(&self, limit: usize) -> Result<Vec<(Car, i64)>> {
        // ---
        let t = self.tables.read().await;

        // stable sort keeps listing order among ties
        let mut ranked: Vec<(Car, i64)> = t
            .sorted_cars(t.cars.values())
            .into_iter()
            .map(|car| {
                let likes = t.like_count(car.id);
                (car, likes)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);

        Ok(ranked)
    }

    async fn toggle_like(&self, user_id: Uuid, car_id: Uuid) -> Result<bool> {
        // ---
        let mut t = self.tables.write().await;
        anyhow::ensure!(t.cars.contains_key(&car_id), "car {car_id} does not exist");

        if t.likes.remove(&(user_id, car_id)) {
            Ok(false)
        } else {
            t.likes.insert((user_id, car_id));
            Ok(true)
        }
    }

    async fn liked_cars(&self, user_id: Uuid) -> Result<Vec<Car>> {
        // ---
        let t = self.tables.read().await;
        let liked = t
            .likes
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, c)| t.cars.get(c));
        Ok(t.sorted_cars(liked))
    }

    async fn liked_by(&self, car_id: Uuid) -> Result<Vec<Uuid>> {
        // ---
        let t = self.tables.read().await;
        Ok(t.likes
            .iter()
            .filter(|(_, c)| *c == car_id)
            .map(|(u, _)| *u)
            .collect())
    }

    async fn create_rental(&self, rental: Rental) -> Result<Rental> {
        // ---
        let mut t = self.tables.write().await;
        anyhow::ensure!(
            t.cars.contains_key(&rental.car_id),
            "car {} does not exist",
            rental.car_id
        );
        t.rentals.insert(rental.id, rental.clone());
        Ok(rental)
    }

    async fn rentals_for_renter(&self, renter_id: Uuid) -> Result<Vec<Rental>> {
        // ---
        let t = self.tables.read().await;
        Ok(newest_first(
            t.rentals
                .values()
                .filter(|r| r.renter_id == renter_id)
                .cloned()
                .collect(),
        ))
    }
}
