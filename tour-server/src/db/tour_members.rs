//! Booking (tour member) queries, including the payment-reminder listing

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::payment::{Payment, PaymentTxnStatus};
use shared::models::tour_member::{
    derive_payment_status, PaymentStatus, ReminderFilter, TourMember, TourMemberCreate,
    TourMemberDetail, TourMemberFilter, TourMemberStats, TourMemberUpdate, TourMemberWithPackage,
};
use shared::pagination::{PageQuery, Paginated};
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::ServiceResult;

const BOOKING_COLUMNS: &str = "id, tour_package_id, member_count, package_price, net_cost, \
     discount, total_cost, payment_type, payment_status, status, reminder_count, last_reminder, \
     next_reminder, created_by_id, created_at, updated_at";

const WITH_PACKAGE_COLUMNS: &str = "tm.id, tm.tour_package_id, tp.package_name, tp.tour_price, \
     tm.member_count, tm.package_price, tm.net_cost, tm.discount, tm.total_cost, tm.payment_type, \
     tm.payment_status, tm.status, tm.reminder_count, tm.last_reminder, tm.next_reminder, \
     tm.created_by_id, tm.created_at, tm.updated_at";

/// Booking contact data for SMS rendering: the first member on the booking
/// plus its package and payment totals.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReminderTarget {
    pub tour_member_id: i64,
    pub member_name: String,
    pub mobile_no: String,
    pub package_name: String,
    pub total_cost: Decimal,
    pub paid_amount: Decimal,
}

/// Create a booking. Every referenced member id must exist and the package
/// must exist; the initial payment status is always PENDING.
pub async fn create(
    pool: &PgPool,
    payload: &TourMemberCreate,
    created_by: i64,
) -> ServiceResult<TourMemberDetail> {
    let mut tx = pool.begin().await?;

    let package_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tour_packages WHERE id = $1)")
            .bind(payload.tour_package_id)
            .fetch_one(&mut *tx)
            .await?;
    if !package_exists {
        return Err(AppError::new(ErrorCode::TourPackageNotFound).into());
    }

    check_members_exist(&mut tx, &payload.member_ids).await?;

    let id = super::snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO tour_members \
            (id, tour_package_id, member_count, package_price, net_cost, discount, total_cost, \
             payment_type, payment_status, status, reminder_count, next_reminder, created_by_id, \
             created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11, $12, $13, $13)",
    )
    .bind(id)
    .bind(payload.tour_package_id)
    .bind(payload.member_count)
    .bind(payload.package_price)
    .bind(payload.net_cost)
    .bind(payload.discount)
    .bind(payload.total_cost)
    .bind(payload.payment_type)
    .bind(PaymentStatus::Pending)
    .bind(payload.status.as_deref().unwrap_or("BOOKED"))
    .bind(payload.next_reminder)
    .bind(created_by)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_join_rows(&mut tx, id, &payload.member_ids).await?;

    tx.commit().await?;
    get(pool, id).await
}

/// Full booking detail: package summary, members and payments.
pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<TourMemberDetail> {
    let booking = sqlx::query_as::<_, TourMemberWithPackage>(&format!(
        "SELECT {WITH_PACKAGE_COLUMNS} FROM tour_members tm \
         JOIN tour_packages tp ON tp.id = tm.tour_package_id WHERE tm.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::TourMemberNotFound))?;

    let members = sqlx::query_as(
        "SELECT m.id, m.name, m.mobile_no, m.address, m.documents, m.created_at, m.updated_at \
         FROM members m JOIN tour_member_members j ON j.member_id = m.id \
         WHERE j.tour_member_id = $1 ORDER BY m.id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let payments = sqlx::query_as::<_, Payment>(
        "SELECT id, tour_member_id, amount, payment_method, note, status, created_by_id, \
                created_at, updated_at \
         FROM payments WHERE tour_member_id = $1 ORDER BY created_at DESC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(TourMemberDetail {
        booking,
        members,
        payments,
    })
}

/// Paginated booking list. `status` defaults to BOOKED when absent.
pub async fn list(
    pool: &PgPool,
    filter: &TourMemberFilter,
    page: PageQuery,
) -> ServiceResult<Paginated<TourMemberWithPackage>> {
    let mut count = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM tour_members tm \
         JOIN tour_packages tp ON tp.id = tm.tour_package_id WHERE 1=1",
    );
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {WITH_PACKAGE_COLUMNS} FROM tour_members tm \
         JOIN tour_packages tp ON tp.id = tm.tour_package_id WHERE 1=1"
    ));

    let status = filter.status.as_deref().unwrap_or("BOOKED");
    for builder in [&mut count, &mut query] {
        builder.push(" AND tm.status = ");
        builder.push_bind(status.to_string());
        if let Some(payment_status) = filter.payment_status {
            builder.push(" AND tm.payment_status = ");
            builder.push_bind(payment_status);
        }
        if let Some(payment_type) = filter.payment_type {
            builder.push(" AND tm.payment_type = ");
            builder.push_bind(payment_type);
        }
        if let Some(package_id) = filter.tour_package_id {
            builder.push(" AND tm.tour_package_id = ");
            builder.push_bind(package_id);
        }
        if let Some(search) = &filter.search {
            builder.push(" AND tp.package_name ILIKE ");
            builder.push_bind(format!("%{search}%"));
        }
    }

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    // sort keys come from closed enums, safe to splice
    query.push(format!(
        " ORDER BY tm.{} {} LIMIT ",
        filter.sort_by.column(),
        filter.sort_order.keyword()
    ));
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let bookings = query
        .build_query_as::<TourMemberWithPackage>()
        .fetch_all(pool)
        .await?;
    Ok(Paginated::new(bookings, total, page))
}

/// Partial update. When member ids are supplied they replace the whole set;
/// when total_cost changes without an explicit payment_status the status is
/// recomputed from the PAID payments.
pub async fn update(
    pool: &PgPool,
    id: i64,
    payload: &TourMemberUpdate,
) -> ServiceResult<TourMemberDetail> {
    let mut tx = pool.begin().await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tour_members WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if !exists {
        return Err(AppError::new(ErrorCode::TourMemberNotFound).into());
    }

    if let Some(package_id) = payload.tour_package_id {
        let package_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tour_packages WHERE id = $1)")
                .bind(package_id)
                .fetch_one(&mut *tx)
                .await?;
        if !package_exists {
            return Err(AppError::new(ErrorCode::TourPackageNotFound).into());
        }
    }

    if let Some(member_ids) = &payload.member_ids {
        check_members_exist(&mut tx, member_ids).await?;
        sqlx::query("DELETE FROM tour_member_members WHERE tour_member_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_join_rows(&mut tx, id, member_ids).await?;
    }

    let booking = sqlx::query_as::<_, TourMember>(&format!(
        "UPDATE tour_members SET \
            tour_package_id = COALESCE($2, tour_package_id), \
            member_count = COALESCE($3, member_count), \
            package_price = COALESCE($4, package_price), \
            net_cost = COALESCE($5, net_cost), \
            discount = COALESCE($6, discount), \
            total_cost = COALESCE($7, total_cost), \
            payment_type = COALESCE($8, payment_type), \
            payment_status = COALESCE($9, payment_status), \
            status = COALESCE($10, status), \
            reminder_count = COALESCE($11, reminder_count), \
            last_reminder = COALESCE($12, last_reminder), \
            next_reminder = COALESCE($13, next_reminder), \
            updated_at = $14 \
         WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.tour_package_id)
    .bind(payload.member_count)
    .bind(payload.package_price)
    .bind(payload.net_cost)
    .bind(payload.discount)
    .bind(payload.total_cost)
    .bind(payload.payment_type)
    .bind(payload.payment_status)
    .bind(payload.status.as_deref())
    .bind(payload.reminder_count)
    .bind(payload.last_reminder)
    .bind(payload.next_reminder)
    .bind(now_millis())
    .fetch_one(&mut *tx)
    .await?;

    if payload.total_cost.is_some() && payload.payment_status.is_none() {
        let paid = paid_total(&mut tx, id).await?;
        let status = derive_payment_status(paid, booking.total_cost);
        sqlx::query("UPDATE tour_members SET payment_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    get(pool, id).await
}

/// Delete a booking; payments and join rows cascade.
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let result = sqlx::query("DELETE FROM tour_members WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::TourMemberNotFound).into());
    }
    Ok(())
}

pub async fn stats(pool: &PgPool) -> ServiceResult<TourMemberStats> {
    let stats = sqlx::query_as::<_, TourMemberStats>(
        "SELECT COUNT(*) AS total_bookings, \
                COUNT(*) FILTER (WHERE payment_status = 'PENDING') AS pending_payments, \
                COUNT(*) FILTER (WHERE payment_status = 'PARTIAL') AS partial_payments, \
                COUNT(*) FILTER (WHERE payment_status = 'PAID') AS paid_bookings, \
                (SELECT COALESCE(SUM(amount), 0) FROM payments WHERE status = 'PAID') \
                    AS total_revenue \
         FROM tour_members",
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

/// Non-PAID bookings ordered by urgency: payment status, outstanding cost,
/// then recency.
pub async fn list_payment_reminders(
    pool: &PgPool,
    filter: &ReminderFilter,
    page: PageQuery,
) -> ServiceResult<Paginated<TourMemberWithPackage>> {
    let mut count = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM tour_members tm \
         JOIN tour_packages tp ON tp.id = tm.tour_package_id \
         WHERE tm.payment_status <> 'PAID'",
    );
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {WITH_PACKAGE_COLUMNS} FROM tour_members tm \
         JOIN tour_packages tp ON tp.id = tm.tour_package_id \
         WHERE tm.payment_status <> 'PAID'"
    ));

    for builder in [&mut count, &mut query] {
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            builder.push(" AND (tp.package_name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR EXISTS (SELECT 1 FROM tour_member_members j \
                 JOIN members m ON m.id = j.member_id \
                 WHERE j.tour_member_id = tm.id AND (m.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR m.mobile_no LIKE ");
            builder.push_bind(pattern);
            builder.push(")))");
        }
        if let Some(package_id) = filter.tour_package_id {
            builder.push(" AND tm.tour_package_id = ");
            builder.push_bind(package_id);
        }
        if let Some(payment_status) = filter.payment_status {
            builder.push(" AND tm.payment_status = ");
            builder.push_bind(payment_status);
        }
        if let Some(payment_type) = filter.payment_type {
            builder.push(" AND tm.payment_type = ");
            builder.push_bind(payment_type);
        }
        if let Some(from) = filter.from_date {
            builder.push(" AND tm.created_at >= ");
            builder.push_bind(from);
        }
        if let Some(to) = filter.to_date {
            builder.push(" AND tm.created_at <= ");
            builder.push_bind(to);
        }
    }

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    query.push(" ORDER BY tm.payment_status DESC, tm.total_cost DESC, tm.created_at DESC LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let bookings = query
        .build_query_as::<TourMemberWithPackage>()
        .fetch_all(pool)
        .await?;
    Ok(Paginated::new(bookings, total, page))
}

/// Contact data for one booking's reminder SMS.
pub async fn reminder_target(pool: &PgPool, id: i64) -> ServiceResult<ReminderTarget> {
    sqlx::query_as::<_, ReminderTarget>(
        "SELECT tm.id AS tour_member_id, m.name AS member_name, m.mobile_no, tp.package_name, \
                tm.total_cost, \
                COALESCE((SELECT SUM(p.amount) FROM payments p \
                          WHERE p.tour_member_id = tm.id AND p.status = 'PAID'), 0) \
                    AS paid_amount \
         FROM tour_members tm \
         JOIN tour_packages tp ON tp.id = tm.tour_package_id \
         JOIN LATERAL (SELECT m.name, m.mobile_no FROM members m \
                       JOIN tour_member_members j ON j.member_id = m.id \
                       WHERE j.tour_member_id = tm.id ORDER BY m.id LIMIT 1) m ON TRUE \
         WHERE tm.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::TourMemberNotFound).into())
}

/// Record a sent reminder: count + 1, last_reminder = now. `next_reminder`,
/// when given, overwrites the stored schedule.
pub async fn record_reminder(
    pool: &PgPool,
    id: i64,
    next_reminder: Option<i64>,
) -> ServiceResult<TourMember> {
    sqlx::query_as::<_, TourMember>(&format!(
        "UPDATE tour_members SET \
            reminder_count = reminder_count + 1, \
            last_reminder = $2, \
            next_reminder = COALESCE($3, next_reminder), \
            updated_at = $2 \
         WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(id)
    .bind(now_millis())
    .bind(next_reminder)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::TourMemberNotFound).into())
}

async fn check_members_exist(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    member_ids: &[i64],
) -> ServiceResult<()> {
    let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE id = ANY($1)")
        .bind(member_ids)
        .fetch_one(&mut **tx)
        .await?;
    if found != member_ids.len() as i64 {
        return Err(AppError::new(ErrorCode::MembersMissing).into());
    }
    Ok(())
}

async fn insert_join_rows(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    tour_member_id: i64,
    member_ids: &[i64],
) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO tour_member_members (tour_member_id, member_id) \
         SELECT $1, UNNEST($2::bigint[])",
    )
    .bind(tour_member_id)
    .bind(member_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn paid_total(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    tour_member_id: i64,
) -> ServiceResult<Decimal> {
    let paid: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM payments \
         WHERE tour_member_id = $1 AND status = $2",
    )
    .bind(tour_member_id)
    .bind(PaymentTxnStatus::Paid)
    .fetch_one(&mut **tx)
    .await?;
    Ok(paid)
}
