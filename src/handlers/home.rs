use axum::extract::{Query, State};

use super::shared_types::ApiResponse;
use crate::app_state::AppState;
use crate::domain::CarFilterQuery;
use crate::services::catalog::{self, HomePage};
use crate::services::ServiceError;

/// Handler for the home listing (GET /).
///
/// Filters come from `?city=&year_from=&year_to=&capacity=`; empty values
/// are ignored. The five most liked cars are always included.
#[tracing::instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<CarFilterQuery>,
) -> Result<ApiResponse<HomePage>, ServiceError> {
    // ---
    let page = catalog::home(state.repository().as_ref(), query).await?;
    Ok(ApiResponse { data: page })
}
