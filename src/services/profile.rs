use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ServiceResult;
use super::{catalog, favorites, rentals};
use crate::domain::{Car, Rental, Repository, User};

/// The signed-in user's dashboard.
#[derive(Debug, Serialize)]
pub struct Profile {
    // ---
    pub user: User,
    pub rentals: Vec<Rental>,
    pub liked_cars: Vec<Car>,
    pub owned_cars: Vec<Car>,
    pub total_spent: Decimal,
}

pub async fn profile(repo: &dyn Repository, user: User) -> ServiceResult<Profile> {
    // ---
    let rentals = rentals::list_for_renter(repo, user.id).await?;
    let liked_cars = favorites::liked_cars(repo, user.id).await?;
    let owned_cars = catalog::list_owned(repo, user.id).await?;
    let total_spent: Decimal = rentals.iter().map(|r| r.total_price).sum();

    Ok(Profile {
        user,
        rentals,
        liked_cars,
        owned_cars,
        total_spent,
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::RentalForm;
    use crate::infrastructure::create_memory_repository;
    use crate::services::test_support::{car_form, seed_user};

    #[tokio::test]
    async fn aggregates_rentals_likes_and_listings() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let renter = seed_user(repo.as_ref(), "2").await;

        let car = catalog::create(repo.as_ref(), &owner, &car_form("50.00"))
            .await
            .unwrap();
        favorites::toggle_like(repo.as_ref(), &renter, car.id)
            .await
            .unwrap();

        for (start, end) in [("2024-01-01", "2024-01-04"), ("2024-02-01", "2024-02-01")] {
            let form = RentalForm {
                start_date: Some(start.into()),
                end_date: Some(end.into()),
            };
            rentals::book(repo.as_ref(), &renter, car.id, &form)
                .await
                .unwrap();
        }

        let page = profile(repo.as_ref(), renter.clone()).await.unwrap();
        assert_eq!(page.user.id, renter.id);
        assert_eq!(page.rentals.len(), 2);
        assert_eq!(page.total_spent.to_string(), "200.00");
        assert_eq!(page.liked_cars, vec![car.clone()]);
        assert!(page.owned_cars.is_empty());

        let owner_page = profile(repo.as_ref(), owner).await.unwrap();
        assert_eq!(owner_page.owned_cars, vec![car]);
        assert_eq!(owner_page.total_spent, Decimal::ZERO);
    }
}
