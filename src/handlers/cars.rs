use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::current_user::CurrentUser;
use super::shared_types::ApiResponse;
use crate::app_state::AppState;
use crate::domain::{Car, CarForm};
use crate::services::catalog::{self, RankedCar};
use crate::services::ServiceError;

/// Handler for listing a car (POST /cars). The caller becomes the owner.
#[tracing::instrument(skip(state, current, form))]
pub async fn create_car(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<CarForm>,
) -> Result<(StatusCode, ApiResponse<Car>), ServiceError> {
    // ---
    let car = catalog::create(state.repository().as_ref(), &current.user, &form).await?;
    state.metrics().record_car_listed();

    Ok((StatusCode::CREATED, ApiResponse { data: car }))
}

/// Handler for car detail (GET /cars/{id}); public.
#[tracing::instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
) -> Result<ApiResponse<RankedCar>, ServiceError> {
    // ---
    let car = catalog::get(state.repository().as_ref(), car_id).await?;
    Ok(ApiResponse { data: car })
}

/// Handler for replacing a listing (PUT /cars/{id}).
///
/// A non-owner is redirected to `/profile` and the car is left untouched.
#[tracing::instrument(skip(state, current, form))]
pub async fn update_car(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    current: CurrentUser,
    Json(form): Json<CarForm>,
) -> Result<ApiResponse<Car>, ServiceError> {
    // ---
    let car = catalog::update(state.repository().as_ref(), car_id, &current.user, &form).await?;
    Ok(ApiResponse { data: car })
}

/// Handler for removing a listing (DELETE /cars/{id}).
#[tracing::instrument(skip(state, current))]
pub async fn delete_car(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    current: CurrentUser,
) -> Result<StatusCode, ServiceError> {
    // ---
    catalog::delete(state.repository().as_ref(), car_id, &current.user).await?;
    Ok(StatusCode::NO_CONTENT)
}
