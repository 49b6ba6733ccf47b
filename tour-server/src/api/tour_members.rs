//! Booking (tour member) handlers, nested payments and reminders

use axum::extract::{Path, State};
use axum::Extension;
use serde::Serialize;
use shared::error::ApiResponse;
use shared::models::payment::{Payment, PaymentCreate, PaymentUpdate};
use shared::models::tour_member::{
    PaymentStatus, ReminderFilter, TourMember, TourMemberCreate, TourMemberDetail,
    TourMemberFilter, TourMemberStats, TourMemberUpdate, TourMemberWithPackage,
};
use shared::pagination::{PageQuery, Paginated};
use validator::Validate;

use crate::api::extract::{Json, Query};
use crate::auth::AuthUser;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<TourMemberFilter>,
) -> ServiceResult<ApiResponse<Paginated<TourMemberWithPackage>>> {
    page.validate()?;
    let bookings = db::tour_members::list(&state.pool, &filter, page).await?;
    Ok(ApiResponse::ok("Tour members fetched successfully", bookings))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<TourMemberDetail>> {
    let booking = db::tour_members::get(&state.pool, id).await?;
    Ok(ApiResponse::ok("Tour member fetched successfully", booking))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<TourMemberCreate>,
) -> ServiceResult<ApiResponse<TourMemberDetail>> {
    payload.validate()?;
    let booking = db::tour_members::create(&state.pool, &payload, auth.id).await?;
    tracing::info!(
        tour_member_id = booking.booking.id,
        members = payload.member_ids.len(),
        "tour member created"
    );
    Ok(ApiResponse::created(
        "Tour member created successfully",
        booking,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TourMemberUpdate>,
) -> ServiceResult<ApiResponse<TourMemberDetail>> {
    payload.validate()?;
    let booking = db::tour_members::update(&state.pool, id, &payload).await?;
    Ok(ApiResponse::ok("Tour member updated successfully", booking))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<()>> {
    db::tour_members::delete(&state.pool, id).await?;
    tracing::info!(tour_member_id = id, "tour member deleted");
    Ok(ApiResponse::message("Tour member deleted successfully"))
}

pub async fn stats(
    State(state): State<AppState>,
) -> ServiceResult<ApiResponse<TourMemberStats>> {
    let stats = db::tour_members::stats(&state.pool).await?;
    Ok(ApiResponse::ok("Tour member stats fetched successfully", stats))
}

pub async fn list_payment_reminders(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ReminderFilter>,
) -> ServiceResult<ApiResponse<Paginated<TourMemberWithPackage>>> {
    page.validate()?;
    let reminders = db::tour_members::list_payment_reminders(&state.pool, &filter, page).await?;
    Ok(ApiResponse::ok(
        "Payment reminders fetched successfully",
        reminders,
    ))
}

/// Record a manually sent reminder: count + 1, last reminder timestamp.
pub async fn record_reminder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<TourMember>> {
    let booking = db::tour_members::record_reminder(&state.pool, id, None).await?;
    Ok(ApiResponse::ok("Reminder recorded successfully", booking))
}

// ==================== Nested payments ====================

/// Payment mutation result: the row plus the booking's reconciled status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub payment: Payment,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResult {
    pub payment_status: PaymentStatus,
}

pub async fn add_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentCreate>,
) -> ServiceResult<ApiResponse<PaymentResult>> {
    payload.validate()?;
    let (payment, payment_status) =
        db::payments::create(&state.pool, id, &payload, auth.id).await?;
    tracing::info!(
        tour_member_id = id,
        payment_id = payment.id,
        status = ?payment_status,
        "payment added"
    );
    Ok(ApiResponse::created(
        "Payment added successfully",
        PaymentResult {
            payment,
            payment_status,
        },
    ))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(i64, i64)>,
    Json(payload): Json<PaymentUpdate>,
) -> ServiceResult<ApiResponse<PaymentResult>> {
    payload.validate()?;
    let (payment, payment_status) =
        db::payments::update(&state.pool, id, payment_id, &payload).await?;
    Ok(ApiResponse::ok(
        "Payment updated successfully",
        PaymentResult {
            payment,
            payment_status,
        },
    ))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(i64, i64)>,
) -> ServiceResult<ApiResponse<PaymentStatusResult>> {
    let payment_status = db::payments::delete(&state.pool, id, payment_id).await?;
    tracing::info!(tour_member_id = id, payment_id, "payment deleted");
    Ok(ApiResponse::ok(
        "Payment deleted successfully",
        PaymentStatusResult { payment_status },
    ))
}
