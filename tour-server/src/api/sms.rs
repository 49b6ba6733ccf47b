//! Payment-reminder SMS handlers
//!
//! Messages are `{{placeholder}}` templates rendered per booking with the
//! primary member's name and the booking's payment figures. A successful
//! send bumps the booking's reminder counters.

use std::collections::HashMap;

use axum::extract::State;
use axum::Extension;
use serde::{Deserialize, Serialize};
use shared::error::ApiResponse;
use shared::util::now_millis;
use validator::Validate;

use crate::api::extract::Json;
use crate::auth::AuthUser;
use crate::db;
use crate::db::tour_members::ReminderTarget;
use crate::error::ServiceResult;
use crate::sms::{default_next_reminder, render_template};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkSmsRequest {
    /// Booking ids to remind
    #[validate(length(min = 1, message = "at least one tour member must be selected"))]
    pub member_ids: Vec<i64>,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    /// Next-reminder date (Unix ms); defaults to seven days from now
    pub schedule_date: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IndividualSmsRequest {
    /// Booking id
    pub member_id: i64,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsFailure {
    pub tour_member_id: i64,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSmsResult {
    pub sent: usize,
    pub failed: Vec<SmsFailure>,
}

/// Send one reminder per booking; failures are collected, not fatal, so one
/// bad number never blocks the rest of the batch.
pub async fn send_bulk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<BulkSmsRequest>,
) -> ServiceResult<ApiResponse<BulkSmsResult>> {
    payload.validate()?;

    let next_reminder = payload
        .schedule_date
        .unwrap_or_else(|| default_next_reminder(now_millis()));

    let mut sent = 0;
    let mut failed = Vec::new();
    for &id in &payload.member_ids {
        match send_one(&state, id, &payload.message, Some(next_reminder)).await {
            Ok(()) => sent += 1,
            Err(err) => {
                let app: shared::error::AppError = err.into();
                failed.push(SmsFailure {
                    tour_member_id: id,
                    error: app.message,
                });
            }
        }
    }

    tracing::info!(
        sent,
        failed = failed.len(),
        sent_by = auth.id,
        "bulk reminder SMS finished"
    );
    Ok(ApiResponse::ok(
        "Bulk SMS processed",
        BulkSmsResult { sent, failed },
    ))
}

/// Send one reminder to a single booking; the stored next-reminder schedule
/// is left untouched.
pub async fn send_individual(
    State(state): State<AppState>,
    Json(payload): Json<IndividualSmsRequest>,
) -> ServiceResult<ApiResponse<()>> {
    payload.validate()?;
    send_one(&state, payload.member_id, &payload.message, None).await?;
    Ok(ApiResponse::message("SMS sent successfully"))
}

async fn send_one(
    state: &AppState,
    tour_member_id: i64,
    template: &str,
    next_reminder: Option<i64>,
) -> ServiceResult<()> {
    let target = db::tour_members::reminder_target(&state.pool, tour_member_id).await?;
    let message = render_template(template, &template_values(&target));

    state.sms.send(&target.mobile_no, &message).await?;
    db::tour_members::record_reminder(&state.pool, tour_member_id, next_reminder).await?;
    Ok(())
}

fn template_values(target: &ReminderTarget) -> HashMap<&'static str, String> {
    let due = target.total_cost - target.paid_amount;
    HashMap::from([
        ("name", target.member_name.clone()),
        ("packageName", target.package_name.clone()),
        ("totalCost", target.total_cost.to_string()),
        ("paidAmount", target.paid_amount.to_string()),
        ("dueAmount", due.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn template_values_include_due_amount() {
        let target = ReminderTarget {
            tour_member_id: 1,
            member_name: "Asha".into(),
            mobile_no: "9876543210".into(),
            package_name: "Ladakh 7D".into(),
            total_cost: Decimal::from(45_000),
            paid_amount: Decimal::from(20_000),
        };
        let values = template_values(&target);
        assert_eq!(values["dueAmount"], "25000");
        let msg = render_template(
            "Dear {{name}}, Rs.{{dueAmount}} pending for {{packageName}}.",
            &values,
        );
        assert_eq!(msg, "Dear Asha, Rs.25000 pending for Ladakh 7D.");
    }
}
