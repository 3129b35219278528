use crate::domain::ValidationErrors;

/// Failures an operation reports to its caller.
///
/// Infrastructure problems arrive as `anyhow::Error` and are wrapped in
/// [`ServiceError::Internal`]; everything else is a rule violation the HTTP
/// layer maps to a specific response.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("only the owner may modify this car")]
    Authorization,

    #[error("owners cannot rent their own car")]
    SelfRental,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid phone number or password")]
    InvalidCredential,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
