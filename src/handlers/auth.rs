use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::current_user::CurrentUser;
use super::shared_types::ApiResponse;
use crate::app_state::AppState;
use crate::domain::{LoginForm, RegisterForm, User};
use crate::services::{identity, ServiceError};

/// Returned by register and login: the session token plus the account.
#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

async fn start_session(state: &AppState, user: User) -> Result<SessionResponse, ServiceError> {
    // ---
    let token = state.sessions().create(user.id, &user.phone_number).await?;
    Ok(SessionResponse { token, user })
}

/// Handler for account creation (POST /auth/register).
///
/// - `201 Created` with a session token; the new user is signed in.
/// - `422 Unprocessable Entity` listing every bad field, including a taken
///   phone number or email.
#[tracing::instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, ApiResponse<SessionResponse>), ServiceError> {
    // ---
    let user = identity::register(state.repository().as_ref(), &form).await?;
    let session = start_session(&state, user).await?;

    Ok((StatusCode::CREATED, ApiResponse { data: session }))
}

/// Handler for phone-number login (POST /auth/login).
///
/// Any mismatch answers `401` with the same message.
#[tracing::instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<ApiResponse<SessionResponse>, ServiceError> {
    // ---
    let user = identity::authenticate(state.repository().as_ref(), form.phone_number(), form.password())
        .await
        .inspect_err(|e| {
            if matches!(e, ServiceError::InvalidCredential) {
                tracing::warn!("login rejected");
            }
        })?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse {
        data: start_session(&state, user).await?,
    })
}

#[tracing::instrument(skip(state, current))]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, ServiceError> {
    // ---
    state.sessions().revoke(&current.token).await?;
    tracing::info!(user_id = %current.user.id, "user logged out");

    Ok(StatusCode::NO_CONTENT)
}
