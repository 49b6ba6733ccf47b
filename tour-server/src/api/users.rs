//! User management handlers

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Extension;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::role::UserRole;
use shared::models::user::{ResetPassword, User, UserCreate, UserUpdate};
use shared::pagination::{PageQuery, Paginated};
use validator::Validate;

use crate::api::extract::{Json, Query};
use crate::auth::AuthUser;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::hash_password;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<UserListQuery>,
) -> ServiceResult<ApiResponse<Paginated<User>>> {
    page.validate()?;
    let users = db::users::list(&state.pool, filter.search.as_deref(), filter.role, page).await?;
    Ok(ApiResponse::ok("Users fetched successfully", users))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<User>> {
    let user = db::users::get(&state.pool, id).await?;
    Ok(ApiResponse::ok("User fetched successfully", user))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> ServiceResult<ApiResponse<User>> {
    payload.validate()?;
    let hash = hash_password(&payload.password)?;
    let user = db::users::create(&state.pool, &payload, &hash).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok(ApiResponse::created("User created successfully", user))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> ServiceResult<ApiResponse<User>> {
    payload.validate()?;
    let user = db::users::update(&state.pool, id, &payload).await?;
    Ok(ApiResponse::ok("User updated successfully", user))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ResetPassword>,
) -> ServiceResult<ApiResponse<()>> {
    payload.validate()?;
    let hash = hash_password(&payload.new_password)?;
    db::users::reset_password(&state.pool, id, &hash).await?;
    tracing::info!(user_id = id, "password reset");
    Ok(ApiResponse::message("Password reset successfully"))
}

/// Admin-only; a user can never delete their own account.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<()>> {
    delete_guard(auth, id)?;
    db::users::delete(&state.pool, id).await?;
    tracing::info!(user_id = id, deleted_by = auth.id, "user deleted");
    Ok(ApiResponse::message("User deleted successfully"))
}

/// Only admins may delete users, and never themselves. Checked before any
/// query runs.
fn delete_guard(auth: AuthUser, target_id: i64) -> Result<(), AppError> {
    if auth.role != UserRole::Admin {
        return Err(AppError::permission_denied());
    }
    if auth.id == target_id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    Ok(())
}

/// Export every user as a `text/csv` attachment.
pub async fn export_csv(State(state): State<AppState>) -> ServiceResult<impl IntoResponse> {
    let users = db::users::list_all(&state.pool).await?;
    let csv = users_to_csv(&users);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"users.csv\"",
            ),
        ],
        csv,
    ))
}

fn users_to_csv(users: &[User]) -> String {
    let mut out = String::from("id,name,email,role,createdAt,updatedAt\n");
    for user in users {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            user.id,
            csv_escape(&user.name),
            csv_escape(&user.email),
            user.role,
            format_millis(user.created_at),
            format_millis(user.updated_at),
        ));
    }
    out
}

/// Quote a CSV field, doubling embedded quotes.
fn csv_escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User {
            id: 1,
            name: name.into(),
            email: email.into(),
            role: UserRole::Staff,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn csv_has_header_and_quoted_fields() {
        let csv = users_to_csv(&[user("Asha", "asha@example.com")]);
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "id,name,email,role,createdAt,updatedAt");
        let row = lines.next().unwrap();
        assert!(row.contains("\"Asha\""));
        assert!(row.contains("\"asha@example.com\""));
        assert!(row.contains("STAFF"));
    }

    #[test]
    fn embedded_quotes_and_commas_survive() {
        let csv = users_to_csv(&[user("Shah, \"AJ\"", "aj@example.com")]);
        assert!(csv.contains("\"Shah, \"\"AJ\"\"\""));
    }

    #[test]
    fn timestamps_are_rfc3339() {
        assert_eq!(format_millis(1_700_000_000_000), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn admin_deleting_own_account_is_bad_request() {
        let admin = AuthUser {
            id: 9,
            role: UserRole::Admin,
        };
        let err = delete_guard(admin, 9).unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotDeleteSelf);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_admin_cannot_delete_users() {
        let manager = AuthUser {
            id: 9,
            role: UserRole::Manager,
        };
        let err = delete_guard(manager, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn admin_may_delete_other_users() {
        let admin = AuthUser {
            id: 9,
            role: UserRole::Admin,
        };
        assert!(delete_guard(admin, 10).is_ok());
    }
}
