//! `AppError` and the uniform JSON response envelope

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error with a typed code and human-readable message.
///
/// The HTTP adapter matches on [`ErrorCode`] exhaustively; no control flow
/// ever inspects `message`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the kind of failure
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional field-level messages (validation failures)
    pub errors: Option<Vec<String>>,
}

impl AppError {
    /// Create an error carrying the code's default message.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            errors: None,
        }
    }

    /// Create an error with a custom message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: None,
        }
    }

    /// Attach field-level error messages.
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// HTTP status for this error.
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn permission_denied() -> Self {
        Self::new(ErrorCode::PermissionDenied)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: invalid value"),
                })
            })
            .collect();
        messages.sort();
        AppError::new(ErrorCode::ValidationFailed).with_errors(messages)
    }
}

/// Uniform API response envelope.
///
/// Success: `{ "success": true, "statusCode": 200, "message": "...", "data": ... }`
/// Failure: `{ "success": false, "statusCode": 404, "message": "...", "errors": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// 200 success with data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status_code: 200,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    /// 201 success with data.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status_code: 201,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// 200 success without data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            status_code: 200,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    /// Error envelope from an AppError.
    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            status_code: err.http_status().as_u16(),
            message: err.message.clone(),
            data: None,
            errors: err.errors.clone(),
        }
    }
}

/// Type alias for Result with AppError.
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        if self.code.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
        }

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);
        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_new_uses_default_message() {
        let err = AppError::new(ErrorCode::UserNotFound);
        assert_eq!(err.code, ErrorCode::UserNotFound);
        assert_eq!(err.message, "User not found");
        assert!(err.errors.is_none());
    }

    #[test]
    fn app_error_custom_message() {
        let err = AppError::with_message(ErrorCode::ValidationFailed, "limit must not exceed 100");
        assert_eq!(err.message, "limit must not exceed 100");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn envelope_success_shape() {
        let resp = ApiResponse::ok("Users fetched successfully", 42);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"statusCode\":200"));
        assert!(json.contains("\"data\":42"));
        assert!(!json.contains("errors"));
    }

    #[test]
    fn envelope_created_shape() {
        let resp = ApiResponse::created("User created successfully", "u1");
        assert_eq!(resp.status_code, 201);
        assert!(resp.success);
    }

    #[test]
    fn envelope_error_shape() {
        let err = AppError::new(ErrorCode::TourMemberNotFound);
        let resp = ApiResponse::<()>::error(&err);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"statusCode\":404"));
        assert!(json.contains("Tour member not found"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn validation_errors_become_field_messages() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1, message = "name is required"))]
            name: String,
        }

        let probe = Probe {
            name: String::new(),
        };
        let err: AppError = probe.validate().unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let errors = err.errors.unwrap();
        assert_eq!(errors, vec!["name: name is required".to_string()]);
    }
}
