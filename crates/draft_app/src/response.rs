//! JSON envelopes shared by every endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use draft_core::ValidationError;
use draft_engine::PipelineError;
use serde::Serialize;

pub const MSG_SUCCESS: &str = "success";
pub const MSG_INVALID_BODY: &str = "invalid request body";
pub const MSG_VALIDATION: &str = "validation failed";
pub const MSG_AUTHENTICATION: &str = "authentication failed";
pub const MSG_CONVERSION: &str = "markdown conversion failed";
pub const MSG_COVER_UPLOAD: &str = "cover image upload failed";
pub const MSG_PUBLISH: &str = "draft creation failed";
pub const MSG_INTERNAL: &str = "internal error";

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: &'static str,
    pub data: T,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: MSG_SUCCESS,
            data,
            timestamp: now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    timestamp: i64,
}

/// Classified failure returned to the caller; `code` in the body mirrors the
/// HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str, details: impl Into<String>) -> Self {
        Self {
            status,
            message,
            details: Some(details.into()),
        }
    }

    pub fn bad_request(message: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, details)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let details = err.to_string();
        match err {
            PipelineError::Validation(ValidationError::MissingCredential(_)) => {
                Self::bad_request(MSG_AUTHENTICATION, details)
            }
            PipelineError::Validation(_) => Self::bad_request(MSG_VALIDATION, details),
            PipelineError::Conversion(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_CONVERSION, details)
            }
            PipelineError::CoverUpload(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_COVER_UPLOAD, details)
            }
            PipelineError::Publish(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_PUBLISH, details)
            }
            PipelineError::Stalled { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL, details)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.status.as_u16(),
            message: self.message,
            details: self.details,
            timestamp: now(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use draft_core::{CredentialField, Stage};
    use draft_engine::PipelineError;

    use super::*;

    #[test]
    fn missing_credentials_are_authentication_failures() {
        let err = ApiError::from(PipelineError::Validation(
            ValidationError::MissingCredential(CredentialField::AppSecret),
        ));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, MSG_AUTHENTICATION);
    }

    #[test]
    fn missing_fields_are_validation_failures() {
        let err = ApiError::from(PipelineError::Validation(ValidationError::MissingField(
            "theme",
        )));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, MSG_VALIDATION);
        assert!(err.details.unwrap().contains("theme"));
    }

    #[test]
    fn stalled_run_is_internal_error() {
        let err = ApiError::from(PipelineError::Stalled {
            stage: Stage::Publish,
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, MSG_INTERNAL);
    }
}
