//! Payment queries and payment-status reconciliation
//!
//! Every mutation runs in one transaction that locks the booking row, applies
//! the change, recomputes the booking's payment status from its PAID payments
//! and commits. Concurrent mutations against the same booking serialize on
//! the row lock, so the stored status always reflects the final sum.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::payment::{Payment, PaymentCreate, PaymentTxnStatus, PaymentUpdate};
use shared::models::tour_member::{derive_payment_status, PaymentStatus};
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::ServiceResult;

const PAYMENT_COLUMNS: &str =
    "id, tour_member_id, amount, payment_method, note, status, created_by_id, created_at, \
     updated_at";

/// Add a payment to a booking and reconcile its status.
pub async fn create(
    pool: &PgPool,
    tour_member_id: i64,
    payload: &PaymentCreate,
    created_by: i64,
) -> ServiceResult<(Payment, PaymentStatus)> {
    let mut tx = pool.begin().await?;
    let total_cost = lock_booking(&mut tx, tour_member_id).await?;

    let now = now_millis();
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO payments \
            (id, tour_member_id, amount, payment_method, note, status, created_by_id, \
             created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {PAYMENT_COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(tour_member_id)
    .bind(payload.amount)
    .bind(&payload.payment_method)
    .bind(payload.note.as_deref())
    .bind(payload.status)
    .bind(created_by)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let status = reconcile(&mut tx, tour_member_id, total_cost).await?;
    tx.commit().await?;
    Ok((payment, status))
}

/// Update a payment on a booking and reconcile its status. The payment must
/// belong to the booking.
pub async fn update(
    pool: &PgPool,
    tour_member_id: i64,
    payment_id: i64,
    payload: &PaymentUpdate,
) -> ServiceResult<(Payment, PaymentStatus)> {
    let mut tx = pool.begin().await?;
    let total_cost = lock_booking(&mut tx, tour_member_id).await?;

    let payment = sqlx::query_as::<_, Payment>(&format!(
        "UPDATE payments SET \
            amount = COALESCE($3, amount), \
            payment_method = COALESCE($4, payment_method), \
            note = COALESCE($5, note), \
            status = COALESCE($6, status), \
            updated_at = $7 \
         WHERE id = $1 AND tour_member_id = $2 RETURNING {PAYMENT_COLUMNS}"
    ))
    .bind(payment_id)
    .bind(tour_member_id)
    .bind(payload.amount)
    .bind(payload.payment_method.as_deref())
    .bind(payload.note.as_deref())
    .bind(payload.status)
    .bind(now_millis())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::PaymentNotFound))?;

    let status = reconcile(&mut tx, tour_member_id, total_cost).await?;
    tx.commit().await?;
    Ok((payment, status))
}

/// Delete a payment from a booking and reconcile its status.
pub async fn delete(
    pool: &PgPool,
    tour_member_id: i64,
    payment_id: i64,
) -> ServiceResult<PaymentStatus> {
    let mut tx = pool.begin().await?;
    let total_cost = lock_booking(&mut tx, tour_member_id).await?;

    let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND tour_member_id = $2")
        .bind(payment_id)
        .bind(tour_member_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::PaymentNotFound).into());
    }

    let status = reconcile(&mut tx, tour_member_id, total_cost).await?;
    tx.commit().await?;
    Ok(status)
}

/// Lock the booking row for the duration of the transaction; returns its
/// total cost for the recompute.
async fn lock_booking(
    tx: &mut Transaction<'_, Postgres>,
    tour_member_id: i64,
) -> ServiceResult<Decimal> {
    sqlx::query_scalar("SELECT total_cost FROM tour_members WHERE id = $1 FOR UPDATE")
        .bind(tour_member_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TourMemberNotFound).into())
}

/// Recompute the booking's payment status from its PAID payments and persist
/// it. Must run inside the transaction that holds the booking lock.
async fn reconcile(
    tx: &mut Transaction<'_, Postgres>,
    tour_member_id: i64,
    total_cost: Decimal,
) -> ServiceResult<PaymentStatus> {
    let paid: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM payments \
         WHERE tour_member_id = $1 AND status = $2",
    )
    .bind(tour_member_id)
    .bind(PaymentTxnStatus::Paid)
    .fetch_one(&mut **tx)
    .await?;

    let status = derive_payment_status(paid, total_cost);

    sqlx::query("UPDATE tour_members SET payment_status = $2, updated_at = $3 WHERE id = $1")
        .bind(tour_member_id)
        .bind(status)
        .bind(now_millis())
        .execute(&mut **tx)
        .await?;

    Ok(status)
}
