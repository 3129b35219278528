use axum::extract::State;

use super::current_user::CurrentUser;
use super::shared_types::ApiResponse;
use crate::app_state::AppState;
use crate::services::profile::{self, Profile};
use crate::services::ServiceError;

/// Handler for GET /profile: rentals, likes, listings and total spent.
#[tracing::instrument(skip(state, current))]
pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<ApiResponse<Profile>, ServiceError> {
    // ---
    let page = profile::profile(state.repository().as_ref(), current.user).await?;
    Ok(ApiResponse { data: page })
}
