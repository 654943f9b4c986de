//! Mapping from core and auth failures to HTTP responses.

use api_shared::ErrorRes;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use raktmap_core::CoreError;

/// Error returned by every handler. Renders as `{ "success": false, "message": ... }`.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// No usable credentials were sent.
    Unauthorized(&'static str),
    /// Credentials were sent but do not grant access.
    Forbidden(&'static str),
    /// The body or path could not be decoded into the expected shape.
    BadRequest(String),
    Internal(&'static str),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self::Core(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections render as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` extractor whose rejections render as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, (*msg).to_string()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, (*msg).to_string()),
            Self::Core(e) => match e {
                CoreError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Text(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                CoreError::RequestNotFound(_) => {
                    (StatusCode::NOT_FOUND, "Blood request not found".into())
                }
                CoreError::DuplicateUser(_) => (StatusCode::CONFLICT, "User already exists".into()),
                CoreError::DuplicateDonor(_) => {
                    (StatusCode::CONFLICT, "Donor already exists".into())
                }
                CoreError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
        } else {
            tracing::debug!("request rejected with {}: {}", status, message);
        }
        (status, Json(ErrorRes::new(message))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(CoreError::InvalidInput("bloodGroup is required".into())),
                StatusCode::BAD_REQUEST,
                "bloodGroup is required",
            ),
            (
                ApiError::from(CoreError::DuplicateUser("a@b.org".into())),
                StatusCode::CONFLICT,
                "User already exists",
            ),
            (
                ApiError::from(CoreError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
            ),
            (
                ApiError::from(CoreError::DirectoryLookup(Box::new(CoreError::StorePoisoned))),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
            ),
            (
                ApiError::BadRequest("Failed to parse the request body as JSON".into()),
                StatusCode::BAD_REQUEST,
                "Failed to parse the request body as JSON",
            ),
            (
                ApiError::Forbidden("Access denied"),
                StatusCode::FORBIDDEN,
                "Access denied",
            ),
        ];

        for (err, status, message) in cases {
            assert_eq!(err.status_and_message(), (status, message.to_string()));
        }
    }
}
