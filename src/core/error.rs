use thiserror::Error;

pub const INVALID_CREDENTIALS: &str = "Email or password is incorrect!";
pub const ACCOUNT_INACTIVE: &str = "The account is inactive!";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const INVALID_TOKEN: &str = "Invalid Token";
pub const REFRESH_TOKEN_NOT_FOUND: &str = "Refresh token not found";
pub const DATA_ALREADY_EXISTS: &str = "The data already exists!";

/// Failures of the service layer. Routes turn these into
/// [`ErrorResponses`](crate::schema::common::ErrorResponses).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("{}", ACCOUNT_INACTIVE)]
    AccountInactive,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: &str) -> Self {
        ServiceError::Validation(vec![message.to_string()])
    }

    pub fn conflict(message: &str) -> Self {
        ServiceError::Conflict(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        ServiceError::NotFound(message.to_string())
    }

    pub fn unauthorized() -> Self {
        ServiceError::Unauthorized(UNAUTHORIZED.to_string())
    }

    pub fn invalid_token() -> Self {
        ServiceError::Unauthorized(INVALID_TOKEN.to_string())
    }

    pub fn refresh_token_not_found() -> Self {
        ServiceError::Forbidden(REFRESH_TOKEN_NOT_FOUND.to_string())
    }

    /// Human readable messages sent back to the client.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::Validation(messages) => messages.clone(),
            ServiceError::Internal(_) => vec!["Internal server error".to_string()],
            other => vec![other.to_string()],
        }
    }
}

/// A unique index rejecting a write is a conflict, not a server failure.
/// Covers the window between a uniqueness check and the insert.
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::debug!("unique violation: {}", db_err);
                ServiceError::conflict(DATA_ALREADY_EXISTS)
            }
            _ => ServiceError::Internal(err),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::from(anyhow::Error::from(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
