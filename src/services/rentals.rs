//! Booking a car for a date range and reading a renter's history.

use chrono::Utc;
use uuid::Uuid;

use super::access::authorize_owner;
use super::catalog::load;
use super::error::{ServiceError, ServiceResult};
use crate::domain::{rental_total, Rental, RentalForm, Repository, User};

/// Books `car_id` for `renter`.
///
/// The price is the car's current daily rate times the billable days and is
/// frozen on the rental. Overlapping bookings are accepted.
pub async fn book(
    repo: &dyn Repository,
    renter: &User,
    car_id: Uuid,
    form: &RentalForm,
) -> ServiceResult<Rental> {
    // ---
    let car = load(repo, car_id).await?;

    if authorize_owner(&car, renter) {
        tracing::warn!(%car_id, user_id = %renter.id, "owner tried to rent own car");
        return Err(ServiceError::SelfRental);
    }

    let dates = form.validate()?;
    let total_price = rental_total(dates.start_date, dates.end_date, car.daily_rental_price());

    let rental = repo
        .create_rental(Rental {
            id: Uuid::new_v4(),
            renter_id: renter.id,
            car_id,
            start_date: dates.start_date,
            end_date: dates.end_date,
            total_price,
            booked_at: Utc::now(),
        })
        .await?;

    tracing::info!(rental_id = %rental.id, %car_id, %total_price, "rental booked");

    Ok(rental)
}

/// Latest start date first.
pub async fn list_for_renter(repo: &dyn Repository, renter_id: Uuid) -> ServiceResult<Vec<Rental>> {
    Ok(repo.rentals_for_renter(renter_id).await?)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::infrastructure::create_memory_repository;
    use crate::services::catalog;
    use crate::services::test_support::{car_form, seed_user};

    fn dates(start: &str, end: &str) -> RentalForm {
        // ---
        RentalForm {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
        }
    }

    #[tokio::test]
    async fn prices_by_billable_days() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let renter = seed_user(repo.as_ref(), "2").await;
        let car = catalog::create(repo.as_ref(), &owner, &car_form("50.00"))
            .await
            .unwrap();

        let three_days = book(repo.as_ref(), &renter, car.id, &dates("2024-01-01", "2024-01-04"))
            .await
            .unwrap();
        assert_eq!(three_days.total_price.to_string(), "150.00");

        let same_day = book(repo.as_ref(), &renter, car.id, &dates("2024-01-01", "2024-01-01"))
            .await
            .unwrap();
        assert_eq!(same_day.total_price.to_string(), "50.00");

        let inverted = book(repo.as_ref(), &renter, car.id, &dates("2024-01-05", "2024-01-01"))
            .await
            .unwrap();
        assert_eq!(inverted.total_price, car.daily_rental_price());
    }

    #[tokio::test]
    async fn price_is_a_snapshot() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let renter = seed_user(repo.as_ref(), "2").await;
        let car = catalog::create(repo.as_ref(), &owner, &car_form("50.00"))
            .await
            .unwrap();

        let rental = book(repo.as_ref(), &renter, car.id, &dates("2024-02-01", "2024-02-03"))
            .await
            .unwrap();
        catalog::update(repo.as_ref(), car.id, &owner, &car_form("80.00"))
            .await
            .unwrap();

        let stored = list_for_renter(repo.as_ref(), renter.id).await.unwrap();
        assert_eq!(stored[0].id, rental.id);
        assert_eq!(stored[0].total_price.to_string(), "100.00");
    }

    #[tokio::test]
    async fn owner_cannot_rent_own_car() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let car = catalog::create(repo.as_ref(), &owner, &car_form("50.00"))
            .await
            .unwrap();

        let result = book(repo.as_ref(), &owner, car.id, &dates("2024-01-01", "2024-01-04")).await;
        assert!(matches!(result, Err(ServiceError::SelfRental)));
        assert!(list_for_renter(repo.as_ref(), owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_dates_name_each_field() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let renter = seed_user(repo.as_ref(), "2").await;
        let car = catalog::create(repo.as_ref(), &owner, &car_form("50.00"))
            .await
            .unwrap();

        let result = book(repo.as_ref(), &renter, car.id, &dates("2024-02-30", "tomorrow")).await;
        match result {
            Err(ServiceError::Validation(errors)) => {
                assert!(errors.contains("start_date"));
                assert!(errors.contains("end_date"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn history_is_newest_start_first() {
        // ---
        let repo = create_memory_repository();
        let owner = seed_user(repo.as_ref(), "1").await;
        let renter = seed_user(repo.as_ref(), "2").await;
        let car = catalog::create(repo.as_ref(), &owner, &car_form("10.00"))
            .await
            .unwrap();

        for start in ["2024-03-01", "2024-05-01", "2024-04-01"] {
            book(repo.as_ref(), &renter, car.id, &dates(start, start))
                .await
                .unwrap();
        }

        let starts: Vec<String> = list_for_renter(repo.as_ref(), renter.id)
            .await
            .unwrap()
            .iter()
            .map(|r| r.start_date.to_string())
            .collect();
        assert_eq!(starts, ["2024-05-01", "2024-04-01", "2024-03-01"]);
    }

    #[tokio::test]
    async fn unknown_car_is_not_found() {
        // ---
        let repo = create_memory_repository();
        let renter = seed_user(repo.as_ref(), "2").await;

        let result = book(repo.as_ref(), &renter, Uuid::new_v4(), &dates("2024-01-01", "2024-01-02")).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
