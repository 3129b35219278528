use serde::Serialize;
use uuid::Uuid;

use super::catalog::load;
use super::error::ServiceResult;
use crate::domain::{Car, Repository, User};

/// Outcome of a toggle; `liked` is the state after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
}

/// Adds the like if absent, removes it otherwise. Owners may like their own cars.
pub async fn toggle_like(repo: &dyn Repository, user: &User, car_id: Uuid) -> ServiceResult<LikeState> {
    // ---
    load(repo, car_id).await?;
    let liked = repo.toggle_like(user.id, car_id).await?;

    tracing::debug!(%car_id, user_id = %user.id, liked, "like toggled");

    Ok(LikeState { liked })
}

pub async fn liked_cars(repo: &dyn Repository, user_id: Uuid) -> ServiceResult<Vec<Car>> {
    Ok(repo.liked_cars(user_id).await?)
}

pub async fn liked_by(repo: &dyn Repository, car_id: Uuid) -> ServiceResult<Vec<Uuid>> {
    // ---
    load(repo, car_id).await?;
    Ok(repo.liked_by(car_id).await?)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::infrastructure::create_memory_repository;
    use crate::services::test_support::{car_form, seed_user};
    use crate::services::{catalog, ServiceError};

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let fan = seed_user(repo.as_ref(), "2").await;
        let car = catalog::create(repo.as_ref(), &owner, &car_form("50.00"))
            .await
            .unwrap();

        let first = toggle_like(repo.as_ref(), &fan, car.id).await.unwrap();
        assert!(first.liked);
        assert!(liked_by(repo.as_ref(), car.id).await.unwrap().contains(&fan.id));
        assert_eq!(liked_cars(repo.as_ref(), fan.id).await.unwrap(), vec![car.clone()]);

        let second = toggle_like(repo.as_ref(), &fan, car.id).await.unwrap();
        assert!(!second.liked);
        assert!(!liked_by(repo.as_ref(), car.id).await.unwrap().contains(&fan.id));
        assert!(liked_cars(repo.as_ref(), fan.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_may_like_own_car() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let car = catalog::create(repo.as_ref(), &owner, &car_form("50.00"))
            .await
            .unwrap();

        assert!(toggle_like(repo.as_ref(), &owner, car.id).await.unwrap().liked);
        assert_eq!(catalog::get(repo.as_ref(), car.id).await.unwrap().likes, 1);
    }

    #[tokio::test]
    async fn unknown_car_is_not_found() {
        // ---
        let repo = create_memory_repository();
        let fan = seed_user(repo.as_ref(), "2").await;

        let result = toggle_like(repo.as_ref(), &fan, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound("car"))));
    }
}
