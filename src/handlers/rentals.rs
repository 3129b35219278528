use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::current_user::CurrentUser;
use super::shared_types::ApiResponse;
use crate::app_state::AppState;
use crate::domain::{Rental, RentalForm};
use crate::services::{rentals, ServiceError};

/// Handler for booking a car (POST /cars/{id}/rent).
///
/// - `201 Created` with the rental and its frozen `total_price`.
/// - `303 See Other` to `/` when the caller owns the car; nothing is recorded.
/// - `422` when either date is not a valid `YYYY-MM-DD` calendar date.
#[tracing::instrument(skip(state, current, form))]
pub async fn rent_car(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    current: CurrentUser,
    Json(form): Json<RentalForm>,
) -> Result<(StatusCode, ApiResponse<Rental>), ServiceError> {
    // ---
    let rental = rentals::book(state.repository().as_ref(), &current.user, car_id, &form).await?;
    state.metrics().record_rental_booked();

    Ok((StatusCode::CREATED, ApiResponse { data: rental }))
}
