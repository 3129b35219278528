use axum::extract::{Path, State};
use uuid::Uuid;

use super::current_user::CurrentUser;
use super::shared_types::ApiResponse;
use crate::app_state::AppState;
use crate::services::favorites::{self, LikeState};
use crate::services::ServiceError;

/// Handler for POST /cars/{id}/like. Each call flips the caller's like.
#[tracing::instrument(skip(state, current))]
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    current: CurrentUser,
) -> Result<ApiResponse<LikeState>, ServiceError> {
    // ---
    let like = favorites::toggle_like(state.repository().as_ref(), &current.user, car_id).await?;
    state.metrics().record_like_toggled(like.liked);

    Ok(ApiResponse { data: like })
}
