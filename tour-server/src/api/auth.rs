//! Register and login handlers

use axum::extract::State;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::user::{LoginRequest, LoginResponse, User, UserCreate};
use validator::Validate;

use crate::api::extract::Json;
use crate::auth::create_token;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> ServiceResult<ApiResponse<User>> {
    payload.validate()?;

    let hash = hash_password(&payload.password)?;
    let user = db::users::create(&state.pool, &payload, &hash).await?;

    tracing::info!(user_id = user.id, "user registered");
    Ok(ApiResponse::created("User registered successfully", user))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ServiceResult<ApiResponse<LoginResponse>> {
    payload.validate()?;

    let row = db::users::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    if !verify_password(&payload.password, &row.password) {
        return Err(AppError::new(ErrorCode::InvalidCredentials).into());
    }

    let user = row.into_user();
    let token = create_token(user.id, user.role, &state.jwt_secret)
        .map_err(|e| AppError::internal(format!("token creation failed: {e}")))?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse { token, user },
    ))
}
