//! Dashboard / reporting queries (read-only)

use chrono::{Datelike, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::util::now_millis;
use sqlx::PgPool;

use crate::error::ServiceResult;

// ==================== Overview ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageOverview {
    pub total: i64,
    /// Packages with at least one booking
    pub active: i64,
    pub avg_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatOverview {
    pub total: i64,
    pub occupied: i64,
    pub available: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueOverview {
    pub total: Decimal,
    pub this_month: Decimal,
    pub growth_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOverview {
    pub total: i64,
    pub this_month: i64,
    pub growth_percent: f64,
    pub pending: i64,
    pub partial: i64,
    pub paid: i64,
    pub failed: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub packages: PackageOverview,
    pub seats: SeatOverview,
    pub revenue: RevenueOverview,
    pub bookings: BookingOverview,
    /// Sum of total_cost over PENDING and PARTIAL bookings
    pub pending_amount: Decimal,
    pub total_members: i64,
}

pub async fn overview(pool: &PgPool) -> ServiceResult<DashboardOverview> {
    let now = now_millis();
    let month_start = month_start_millis(now, 0);
    let prev_month_start = month_start_millis(now, 1);

    let (total_packages, active_packages, avg_price): (i64, i64, Decimal) = sqlx::query_as(
        "SELECT COUNT(*), \
                (SELECT COUNT(DISTINCT tour_package_id) FROM tour_members), \
                COALESCE(AVG(tour_price), 0) \
         FROM tour_packages",
    )
    .fetch_one(pool)
    .await?;

    let (total_seats, occupied): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE((SELECT SUM(total_seat) FROM tour_packages), 0)::bigint, \
                COALESCE((SELECT SUM(member_count) FROM tour_members \
                          WHERE status = 'BOOKED'), 0)::bigint",
    )
    .fetch_one(pool)
    .await?;

    let (total_revenue, month_revenue, prev_month_revenue): (Decimal, Decimal, Decimal) =
        sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0), \
                    COALESCE(SUM(amount) FILTER (WHERE created_at >= $1), 0), \
                    COALESCE(SUM(amount) FILTER (WHERE created_at >= $2 AND created_at < $1), 0) \
             FROM payments WHERE status = 'PAID'",
        )
        .bind(month_start)
        .bind(prev_month_start)
        .fetch_one(pool)
        .await?;

    let (total_bookings, month_bookings, prev_month_bookings, pending, partial, paid, failed): (
        i64,
        i64,
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        "SELECT COUNT(*), \
                COUNT(*) FILTER (WHERE created_at >= $1), \
                COUNT(*) FILTER (WHERE created_at >= $2 AND created_at < $1), \
                COUNT(*) FILTER (WHERE payment_status = 'PENDING'), \
                COUNT(*) FILTER (WHERE payment_status = 'PARTIAL'), \
                COUNT(*) FILTER (WHERE payment_status = 'PAID'), \
                COUNT(*) FILTER (WHERE payment_status = 'FAILED') \
         FROM tour_members",
    )
    .bind(month_start)
    .bind(prev_month_start)
    .fetch_one(pool)
    .await?;

    let pending_amount: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_cost), 0) FROM tour_members \
         WHERE payment_status IN ('PENDING', 'PARTIAL')",
    )
    .fetch_one(pool)
    .await?;

    let total_members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(pool)
        .await?;

    Ok(DashboardOverview {
        packages: PackageOverview {
            total: total_packages,
            active: active_packages,
            avg_price,
        },
        seats: SeatOverview {
            total: total_seats,
            occupied,
            available: (total_seats - occupied).max(0),
        },
        revenue: RevenueOverview {
            total: total_revenue,
            this_month: month_revenue,
            growth_percent: growth_percent(
                month_revenue.to_f64().unwrap_or(0.0),
                prev_month_revenue.to_f64().unwrap_or(0.0),
            ),
        },
        bookings: BookingOverview {
            total: total_bookings,
            this_month: month_bookings,
            growth_percent: growth_percent(month_bookings as f64, prev_month_bookings as f64),
            pending,
            partial,
            paid,
            failed,
        },
        pending_amount,
        total_members,
    })
}

// ==================== Recent bookings ====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentBooking {
    pub id: i64,
    pub package_name: String,
    pub member_name: String,
    pub total_cost: Decimal,
    pub payment_status: shared::models::tour_member::PaymentStatus,
    pub created_at: i64,
}

pub async fn recent_bookings(pool: &PgPool, limit: i64) -> ServiceResult<Vec<RecentBooking>> {
    let rows = sqlx::query_as::<_, RecentBooking>(
        "SELECT tm.id, tp.package_name, m.name AS member_name, tm.total_cost, \
                tm.payment_status, tm.created_at \
         FROM tour_members tm \
         JOIN tour_packages tp ON tp.id = tm.tour_package_id \
         JOIN LATERAL (SELECT m.name FROM members m \
                       JOIN tour_member_members j ON j.member_id = m.id \
                       WHERE j.tour_member_id = tm.id ORDER BY m.id LIMIT 1) m ON TRUE \
         ORDER BY tm.created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ==================== Revenue trends ====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTrend {
    /// Bucket label, `YYYY-MM`
    pub month: String,
    pub revenue: Decimal,
    pub transactions: i64,
}

/// Month-bucketed PAID payment sums for the last `months` months.
pub async fn revenue_trends(pool: &PgPool, months: i64) -> ServiceResult<Vec<RevenueTrend>> {
    let from = month_start_millis(now_millis(), months.saturating_sub(1) as u32);
    let rows = sqlx::query_as::<_, RevenueTrend>(
        "SELECT to_char(to_timestamp(created_at / 1000), 'YYYY-MM') AS month, \
                COALESCE(SUM(amount), 0) AS revenue, \
                COUNT(*) AS transactions \
         FROM payments WHERE status = 'PAID' AND created_at >= $1 \
         GROUP BY month ORDER BY month",
    )
    .bind(from)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ==================== Popular packages ====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PopularPackage {
    pub id: i64,
    pub package_name: String,
    pub tour_price: Decimal,
    pub total_seat: i32,
    pub booking_count: i64,
    pub total_members: i64,
    pub revenue: Decimal,
    #[sqlx(skip)]
    pub seat_utilization: f64,
}

/// Packages ranked by booking count, with revenue and seat utilization.
pub async fn popular_packages(pool: &PgPool, limit: i64) -> ServiceResult<Vec<PopularPackage>> {
    let mut rows = sqlx::query_as::<_, PopularPackage>(
        "SELECT tp.id, tp.package_name, tp.tour_price, tp.total_seat, \
                COUNT(tm.id) AS booking_count, \
                COALESCE(SUM(tm.member_count), 0)::bigint AS total_members, \
                COALESCE((SELECT SUM(p.amount) FROM payments p \
                          JOIN tour_members b ON b.id = p.tour_member_id \
                          WHERE b.tour_package_id = tp.id AND p.status = 'PAID'), 0) AS revenue \
         FROM tour_packages tp \
         LEFT JOIN tour_members tm ON tm.tour_package_id = tp.id \
         GROUP BY tp.id, tp.package_name, tp.tour_price, tp.total_seat \
         ORDER BY booking_count DESC, revenue DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    for row in &mut rows {
        row.seat_utilization = if row.total_seat > 0 {
            (row.total_members as f64 / row.total_seat as f64) * 100.0
        } else {
            0.0
        };
    }
    Ok(rows)
}

// ==================== Helpers ====================

/// Start of the month `months_back` months before the one containing `now`,
/// in Unix milliseconds (UTC).
fn month_start_millis(now: i64, months_back: u32) -> i64 {
    let dt = Utc.timestamp_millis_opt(now).single().unwrap_or_default();
    let total = dt.year() * 12 + dt.month0() as i32 - months_back as i32;
    let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
    Utc.with_ymd_and_hms(year, month0 as u32 + 1, 1, 0, 0, 0)
        .single()
        .map(|d| d.timestamp_millis())
        .unwrap_or(0)
}

/// Percentage change against the previous period; a zero baseline reports
/// 100% when anything happened this period, otherwise 0%.
fn growth_percent(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 { 100.0 } else { 0.0 }
    } else {
        ((current - previous) / previous) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn growth_against_zero_baseline() {
        assert_eq!(growth_percent(0.0, 0.0), 0.0);
        assert_eq!(growth_percent(5.0, 0.0), 100.0);
    }

    #[test]
    fn growth_is_signed() {
        assert_eq!(growth_percent(150.0, 100.0), 50.0);
        assert_eq!(growth_percent(50.0, 100.0), -50.0);
    }

    #[test]
    fn month_start_is_first_of_month() {
        // 2026-08-26T12:00:00Z
        let now = 1_782_475_200_000;
        let start = month_start_millis(now, 0);
        let dt = Utc.timestamp_millis_opt(start).single().unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
        assert!(start <= now);
    }

    #[test]
    fn month_start_crosses_year_boundary() {
        // January going one month back lands in December of the prior year
        let jan = Utc
            .with_ymd_and_hms(2026, 1, 15, 10, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        let prev = month_start_millis(jan, 1);
        let dt = Utc.timestamp_millis_opt(prev).single().unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 12, 1));
    }
}
