use std::fmt::Display;

use poem_openapi::{
    payload::Json,
    types::{ParseFromJSON, ToJSON},
    ApiResponse, Object,
};
use serde::{Deserialize, Serialize};

use crate::core::error::ServiceError;

pub const TOO_MANY_REQUESTS: &str = "Too many request!";

#[derive(Object, Deserialize, Serialize, Debug)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            errors: vec![message.to_string()],
        }
    }
}

/// Error side of every endpoint.
#[derive(ApiResponse)]
pub enum ErrorResponses {
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    #[oai(status = 429)]
    TooManyRequests(Json<ErrorResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<ErrorResponse>),
}

impl ErrorResponses {
    pub fn bad_request(errors: Vec<String>) -> Self {
        ErrorResponses::BadRequest(Json(ErrorResponse { errors }))
    }

    pub fn too_many_requests() -> Self {
        ErrorResponses::TooManyRequests(Json(ErrorResponse::new(TOO_MANY_REQUESTS)))
    }

    /// Log where the failure happened, answer with a bare 500.
    pub fn internal(module: &str, function: &str, step: &str, err: &impl Display) -> Self {
        tracing::error!("{}.{} {}: {}", module, function, step, err);
        ErrorResponses::InternalServerError(Json(ErrorResponse::new("Internal server error")))
    }
}

impl From<ServiceError> for ErrorResponses {
    fn from(err: ServiceError) -> Self {
        let body = Json(ErrorResponse {
            errors: err.messages(),
        });
        match err {
            ServiceError::Validation(_)
            | ServiceError::InvalidCredentials
            | ServiceError::AccountInactive
            | ServiceError::Conflict(_) => ErrorResponses::BadRequest(body),
            ServiceError::Unauthorized(_) => ErrorResponses::Unauthorized(body),
            ServiceError::Forbidden(_) => ErrorResponses::Forbidden(body),
            ServiceError::NotFound(_) => ErrorResponses::NotFound(body),
            ServiceError::Internal(err) => {
                tracing::error!("{:?}", err);
                ErrorResponses::InternalServerError(body)
            }
        }
    }
}

impl From<anyhow::Error> for ErrorResponses {
    fn from(err: anyhow::Error) -> Self {
        ErrorResponses::from(ServiceError::from(err))
    }
}

impl From<sqlx::Error> for ErrorResponses {
    fn from(err: sqlx::Error) -> Self {
        ErrorResponses::from(ServiceError::from(err))
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Object)]
pub struct PaginateResponse<T: ParseFromJSON + ToJSON> {
    pub counts: u32,
    pub page: u32,
    pub page_count: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

/// Created_by / updated_by reference in detail responses.
#[derive(Object, Deserialize, Serialize, Clone)]
pub struct AuditUser {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use poem::{http::StatusCode, IntoResponse};

    use super::*;

    #[test]
    fn test_service_error_status() {
        let cases = vec![
            (ServiceError::validation("The name is required!"), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (ServiceError::AccountInactive, StatusCode::BAD_REQUEST),
            (ServiceError::conflict("The name cannot be the same!"), StatusCode::BAD_REQUEST),
            (ServiceError::unauthorized(), StatusCode::UNAUTHORIZED),
            (ServiceError::refresh_token_not_found(), StatusCode::FORBIDDEN),
            (ServiceError::not_found("The role does not exist!"), StatusCode::NOT_FOUND),
            (
                ServiceError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let resp = ErrorResponses::from(err).into_response();
            assert_eq!(resp.status(), status);
        }
    }

    #[test]
    fn test_too_many_requests() {
        let resp = ErrorResponses::too_many_requests().into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
