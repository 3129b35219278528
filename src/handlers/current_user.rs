use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::Response,
};

use super::shared_types::ErrorResponse;
use crate::app_state::AppState;
use crate::domain::User;

/// The authenticated caller, resolved from an `Authorization: Bearer <token>` header.
///
/// Guarded handlers take this as an argument; a missing, unknown or expired
/// token short-circuits with `401 Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

fn unauthorized() -> Response {
    ErrorResponse::new("authentication required").with_status(StatusCode::UNAUTHORIZED)
}

fn internal(err: anyhow::Error) -> Response {
    // ---
    tracing::error!("session lookup failed: {err:#}");
    ErrorResponse::new("internal server error").with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    // ---
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // ---
        let token = bearer_token(parts).ok_or_else(unauthorized)?.to_string();

        let session = state
            .sessions()
            .validate(&token)
            .await
            .map_err(internal)?
            .ok_or_else(unauthorized)?;

        let user = state
            .repository()
            .get_user_by_id(session.user_id)
            .await
            .map_err(internal)?
            .filter(|u| u.is_active)
            .ok_or_else(unauthorized)?;

        Ok(CurrentUser { user, token })
    }
}
