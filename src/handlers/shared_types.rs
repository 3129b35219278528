use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::domain::ValidationErrors;
use crate::services::ServiceError;

/// Wrapper type for successful API responses.
///
/// Encapsulates the data payload and prepares it for JSON serialization.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}

impl ErrorResponse {
    // ---
    pub fn new(error: impl Into<String>) -> Self {
        // ---
        Self {
            error: error.into(),
            fields: None,
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Maps each operation failure to its HTTP shape.
///
/// Ownership and self-rental refusals are silent redirects, the same way
/// browsers were bounced back to the profile or home page.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        // ---
        match self {
            ServiceError::Validation(errors) => ErrorResponse {
                error: errors.to_string(),
                fields: Some(errors),
            }
            .with_status(StatusCode::UNPROCESSABLE_ENTITY),
            ServiceError::Authorization => Redirect::to("/profile").into_response(),
            ServiceError::SelfRental => Redirect::to("/").into_response(),
            ServiceError::NotFound(what) => {
                ErrorResponse::new(format!("{what} not found")).with_status(StatusCode::NOT_FOUND)
            }
            ServiceError::InvalidCredential => {
                ErrorResponse::new(ServiceError::InvalidCredential.to_string())
                    .with_status(StatusCode::UNAUTHORIZED)
            }
            ServiceError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                ErrorResponse::new("internal server error")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
