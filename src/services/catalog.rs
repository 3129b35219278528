//! Car listings: browsing, detail and owner-gated mutation.

use serde::Serialize;
use uuid::Uuid;

use super::access::authorize_owner;
use super::error::{ServiceError, ServiceResult};
use crate::domain::{Car, CarFilterQuery, CarForm, Repository, User};

/// Size of the "most liked" strip on the home listing.
pub const MOST_LIKED_LIMIT: usize = 5;

/// A car together with how many users have liked it.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCar {
    // ---
    #[serde(flatten)]
    pub car: Car,
    pub likes: i64,
}

/// Everything the home listing shows.
#[derive(Debug, Serialize)]
pub struct HomePage {
    // ---
    pub cars: Vec<Car>,
    pub most_liked: Vec<RankedCar>,
}

pub async fn list_cars(repo: &dyn Repository, query: CarFilterQuery) -> ServiceResult<Vec<Car>> {
    // ---
    let filter = query.into_filter()?;
    Ok(repo.list_cars(&filter).await?)
}

pub async fn most_liked(repo: &dyn Repository, limit: usize) -> ServiceResult<Vec<RankedCar>> {
    // ---
    let ranked = repo.most_liked_cars(limit).await?;
    Ok(ranked
        .into_iter()
        .map(|(car, likes)| RankedCar { car, likes })
        .collect())
}

pub async fn home(repo: &dyn Repository, query: CarFilterQuery) -> ServiceResult<HomePage> {
    // ---
    Ok(HomePage {
        cars: list_cars(repo, query).await?,
        most_liked: most_liked(repo, MOST_LIKED_LIMIT).await?,
    })
}

/// Car detail with its like count.
pub async fn get(repo: &dyn Repository, car_id: Uuid) -> ServiceResult<RankedCar> {
    // ---
    let car = load(repo, car_id).await?;
    let likes = repo.liked_by(car_id).await?.len() as i64;
    Ok(RankedCar { car, likes })
}

pub async fn create(repo: &dyn Repository, owner: &User, form: &CarForm) -> ServiceResult<Car> {
    // ---
    let attributes = form.validate()?;
    let car = repo.create_car(Car::new(owner.id, attributes)).await?;

    tracing::info!(car_id = %car.id, owner_id = %owner.id, "car listed");

    Ok(car)
}

/// Replaces every listing attribute. The ownership gate runs before the form
/// is looked at, so a non-owner never learns whether their input was valid.
pub async fn update(
    repo: &dyn Repository,
    car_id: Uuid,
    user: &User,
    form: &CarForm,
) -> ServiceResult<Car> {
    // ---
    let car = load(repo, car_id).await?;
    if !authorize_owner(&car, user) {
        tracing::warn!(%car_id, user_id = %user.id, "update by non-owner refused");
        return Err(ServiceError::Authorization);
    }

    let attributes = form.validate()?;
    let updated = repo
        .update_car(car_id, attributes)
        .await?
        .ok_or(ServiceError::NotFound("car"))?;

    tracing::info!(%car_id, "car updated");

    Ok(updated)
}

/// Removes the car along with its rentals and likes.
pub async fn delete(repo: &dyn Repository, car_id: Uuid, user: &User) -> ServiceResult<()> {
    // ---
    let car = load(repo, car_id).await?;
    if !authorize_owner(&car, user) {
        tracing::warn!(%car_id, user_id = %user.id, "delete by non-owner refused");
        return Err(ServiceError::Authorization);
    }

    if !repo.delete_car(car_id).await? {
        return Err(ServiceError::NotFound("car"));
    }

    tracing::info!(%car_id, "car deleted");

    Ok(())
}

pub async fn list_owned(repo: &dyn Repository, user_id: Uuid) -> ServiceResult<Vec<Car>> {
    Ok(repo.list_cars_by_owner(user_id).await?)
}

pub(super) async fn load(repo: &dyn Repository, car_id: Uuid) -> ServiceResult<Car> {
    // ---
    repo.get_car(car_id)
        .await?
        .ok_or(ServiceError::NotFound("car"))
}
