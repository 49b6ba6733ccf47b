//! Enquiry handlers

use axum::extract::{Path, State};
use axum::Extension;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::enquiry::{
    Enquiry, EnquiryCreate, EnquiryStats, EnquiryStatus, EnquiryStatusUpdate, EnquiryUpdate,
};
use shared::pagination::{PageQuery, Paginated};
use validator::Validate;

use crate::api::extract::{Json, Query};
use crate::auth::AuthUser;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnquiryListQuery {
    pub status: Option<EnquiryStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<EnquiryListQuery>,
) -> ServiceResult<ApiResponse<Paginated<Enquiry>>> {
    page.validate()?;
    let enquiries = db::enquiries::list(&state.pool, filter.status, page).await?;
    Ok(ApiResponse::ok("Enquiries fetched successfully", enquiries))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<Enquiry>> {
    let enquiry = db::enquiries::get(&state.pool, id).await?;
    Ok(ApiResponse::ok("Enquiry fetched successfully", enquiry))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<EnquiryCreate>,
) -> ServiceResult<ApiResponse<Enquiry>> {
    payload.validate()?;
    let enquiry = db::enquiries::create(&state.pool, &payload, auth.id).await?;
    tracing::info!(enquiry_id = enquiry.id, "enquiry created");
    Ok(ApiResponse::created("Enquiry created successfully", enquiry))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EnquiryUpdate>,
) -> ServiceResult<ApiResponse<Enquiry>> {
    payload.validate()?;
    let enquiry = db::enquiries::update(&state.pool, id, &payload).await?;
    Ok(ApiResponse::ok("Enquiry updated successfully", enquiry))
}

/// Status transition. The only rule is membership in the status set; any
/// known status may move to any other.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<EnquiryStatusUpdate>,
) -> ServiceResult<ApiResponse<Enquiry>> {
    let status: EnquiryStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::new(ErrorCode::InvalidEnquiryStatus))?;
    let enquiry = db::enquiries::update_status(&state.pool, id, status, auth.id).await?;
    Ok(ApiResponse::ok("Enquiry status updated successfully", enquiry))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<()>> {
    db::enquiries::delete(&state.pool, id).await?;
    tracing::info!(enquiry_id = id, "enquiry deleted");
    Ok(ApiResponse::message("Enquiry deleted successfully"))
}

pub async fn stats(State(state): State<AppState>) -> ServiceResult<ApiResponse<EnquiryStats>> {
    let stats = db::enquiries::stats(&state.pool).await?;
    Ok(ApiResponse::ok("Enquiry stats fetched successfully", stats))
}
