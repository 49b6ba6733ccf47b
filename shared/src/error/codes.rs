//! Error codes for the tour-admin backend
//!
//! Every failure the API can report is one of these variants; the HTTP
//! adapter matches on the code, never on message strings. Codes are grouped
//! by domain:
//! - General (validation, lookup, conflict)
//! - Auth and permission
//! - Users / Members / Tour packages / Bookings / Payments / Enquiries
//! - File upload
//! - SMS gateway and system errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed error code carried by every [`super::AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ==================== General ====================
    /// Request payload or query failed validation
    ValidationFailed,
    /// Generic resource lookup failure
    NotFound,
    /// Resource already exists
    AlreadyExists,
    /// Malformed or unprocessable request
    InvalidRequest,

    // ==================== Auth ====================
    /// Missing or unparseable Authorization header
    NotAuthenticated,
    /// Wrong email or password
    InvalidCredentials,
    /// Bearer token expired
    TokenExpired,
    /// Bearer token failed verification
    TokenInvalid,

    // ==================== Permission ====================
    /// Caller's role is not in the route's allowed set
    PermissionDenied,
    /// A user may not delete their own account
    CannotDeleteSelf,

    // ==================== Users ====================
    UserNotFound,
    /// Email is already registered to another user
    EmailExists,

    // ==================== Members ====================
    MemberNotFound,
    /// One or more referenced member ids do not exist
    MembersMissing,
    /// Requested document is not attached to the member
    DocumentNotFound,

    // ==================== Tour packages ====================
    TourPackageNotFound,
    /// Package has no stored cover photo
    CoverPhotoNotFound,

    // ==================== Bookings / payments ====================
    TourMemberNotFound,
    PaymentNotFound,

    // ==================== Enquiries ====================
    EnquiryNotFound,
    /// Status outside {PENDING, BOOKED, NOT_INTERESTED}
    InvalidEnquiryStatus,

    // ==================== File upload ====================
    FileTooLarge,
    TooManyFiles,
    NoFileProvided,
    FileStorageFailed,

    // ==================== SMS / system ====================
    /// Outbound SMS gateway call failed
    SmsGatewayFailed,
    InternalError,
    DatabaseError,
}

impl ErrorCode {
    /// HTTP status this code maps to on the wire.
    pub const fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidRequest
            | ErrorCode::CannotDeleteSelf
            | ErrorCode::MembersMissing
            | ErrorCode::InvalidEnquiryStatus
            | ErrorCode::FileTooLarge
            | ErrorCode::TooManyFiles
            | ErrorCode::NoFileProvided => StatusCode::BAD_REQUEST,

            ErrorCode::NotAuthenticated
            | ErrorCode::InvalidCredentials
            | ErrorCode::TokenExpired
            | ErrorCode::TokenInvalid => StatusCode::UNAUTHORIZED,

            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,

            ErrorCode::NotFound
            | ErrorCode::UserNotFound
            | ErrorCode::MemberNotFound
            | ErrorCode::DocumentNotFound
            | ErrorCode::TourPackageNotFound
            | ErrorCode::CoverPhotoNotFound
            | ErrorCode::TourMemberNotFound
            | ErrorCode::PaymentNotFound
            | ErrorCode::EnquiryNotFound => StatusCode::NOT_FOUND,

            ErrorCode::AlreadyExists | ErrorCode::EmailExists => StatusCode::CONFLICT,

            ErrorCode::SmsGatewayFailed
            | ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Default developer-facing message for this code.
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            ErrorCode::NotAuthenticated => "Unauthorized",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",

            ErrorCode::PermissionDenied => "Forbidden: insufficient role",
            ErrorCode::CannotDeleteSelf => "You cannot delete your own account",

            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailExists => "User with this email already exists",

            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::MembersMissing => "Some members not found",
            ErrorCode::DocumentNotFound => "Document not found",

            ErrorCode::TourPackageNotFound => "Tour package not found",
            ErrorCode::CoverPhotoNotFound => "Cover photo not found",

            ErrorCode::TourMemberNotFound => "Tour member not found",
            ErrorCode::PaymentNotFound => "Payment not found",

            ErrorCode::EnquiryNotFound => "Enquiry not found",
            ErrorCode::InvalidEnquiryStatus => "Invalid enquiry status",

            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::TooManyFiles => "Too many files",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            ErrorCode::SmsGatewayFailed => "Failed to send SMS",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }

    /// True for codes the server logs as its own fault.
    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::TourMemberNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ErrorCode::EmailExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn self_delete_is_bad_request_not_forbidden() {
        // The delete-user guard reports 400, matching the documented contract
        assert_eq!(
            ErrorCode::CannotDeleteSelf.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn default_messages() {
        assert_eq!(ErrorCode::MembersMissing.message(), "Some members not found");
        assert_eq!(ErrorCode::TourMemberNotFound.message(), "Tour member not found");
        assert_eq!(
            ErrorCode::CannotDeleteSelf.message(),
            "You cannot delete your own account"
        );
    }

    #[test]
    fn server_error_detection() {
        assert!(ErrorCode::DatabaseError.is_server_error());
        assert!(ErrorCode::SmsGatewayFailed.is_server_error());
        assert!(!ErrorCode::UserNotFound.is_server_error());
    }

    #[test]
    fn serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::MemberNotFound).unwrap();
        assert_eq!(json, "\"MEMBER_NOT_FOUND\"");
    }
}
