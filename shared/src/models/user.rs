//! User model and payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::role::UserRole;

/// User entity as exposed by the API (never carries the password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Registration / user-creation payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<UserRole>,
}

/// Partial user update; only supplied fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// Admin/Manager password reset payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPassword {
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub new_password: String,
}

/// Login payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login result: bearer token plus the authenticated user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_payload_validation() {
        let ok = UserCreate {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "secret1".into(),
            role: None,
        };
        assert!(ok.validate().is_ok());

        let bad = UserCreate {
            name: "".into(),
            email: "not-an-email".into(),
            password: "123".into(),
            role: None,
        };
        let errs = bad.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("name"));
        assert!(errs.field_errors().contains_key("email"));
        assert!(errs.field_errors().contains_key("password"));
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = User {
            id: 7,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            role: UserRole::Staff,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"role\":\"STAFF\""));
    }
}
