//! Tour member (booking) model, payment-status derivation and payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::member::Member;
use super::payment::Payment;

/// How the booking is to be paid off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "payment_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    OneTime,
    Emi,
    Partial,
}

/// Aggregate payment state of a booking, always derived from its PAID
/// payments against `total_cost` (never set directly by payment mutations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Failed,
}

/// Reconciliation rule for a booking's payment status: paid sum >= total is
/// PAID, a positive partial sum is PARTIAL, nothing paid is PENDING.
pub fn derive_payment_status(total_paid: Decimal, total_cost: Decimal) -> PaymentStatus {
    if total_paid >= total_cost {
        PaymentStatus::Paid
    } else if total_paid > Decimal::ZERO {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Booking entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TourMember {
    pub id: i64,
    pub tour_package_id: i64,
    pub member_count: i32,
    pub package_price: Decimal,
    pub net_cost: Decimal,
    pub discount: Decimal,
    pub total_cost: Decimal,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    pub status: String,
    pub reminder_count: i32,
    pub last_reminder: Option<i64>,
    pub next_reminder: Option<i64>,
    pub created_by_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Flat list row: booking plus its package summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TourMemberWithPackage {
    pub id: i64,
    pub tour_package_id: i64,
    pub package_name: String,
    pub tour_price: Decimal,
    pub member_count: i32,
    pub package_price: Decimal,
    pub net_cost: Decimal,
    pub discount: Decimal,
    pub total_cost: Decimal,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    pub status: String,
    pub reminder_count: i32,
    pub last_reminder: Option<i64>,
    pub next_reminder: Option<i64>,
    pub created_by_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Full booking detail: members and payments included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourMemberDetail {
    #[serde(flatten)]
    pub booking: TourMemberWithPackage,
    pub members: Vec<Member>,
    pub payments: Vec<Payment>,
}

/// Booking creation payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TourMemberCreate {
    #[validate(length(min = 1, message = "at least one member must be selected"))]
    pub member_ids: Vec<i64>,
    pub tour_package_id: i64,
    #[validate(custom(function = "super::non_negative"))]
    pub package_price: Decimal,
    #[validate(range(min = 1, message = "member count must be at least 1"))]
    pub member_count: i32,
    #[validate(custom(function = "super::non_negative"))]
    pub net_cost: Decimal,
    #[serde(default)]
    #[validate(custom(function = "super::non_negative"))]
    pub discount: Decimal,
    #[validate(custom(function = "super::non_negative"))]
    pub total_cost: Decimal,
    pub payment_type: PaymentType,
    pub next_reminder: Option<i64>,
    pub status: Option<String>,
}

/// Partial booking update; member ids, when present, replace the whole set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TourMemberUpdate {
    #[validate(length(min = 1, message = "at least one member must be selected"))]
    pub member_ids: Option<Vec<i64>>,
    pub tour_package_id: Option<i64>,
    #[validate(custom(function = "super::non_negative"))]
    pub package_price: Option<Decimal>,
    #[validate(range(min = 1, message = "member count must be at least 1"))]
    pub member_count: Option<i32>,
    #[validate(custom(function = "super::non_negative"))]
    pub net_cost: Option<Decimal>,
    #[validate(custom(function = "super::non_negative"))]
    pub discount: Option<Decimal>,
    #[validate(custom(function = "super::non_negative"))]
    pub total_cost: Option<Decimal>,
    pub payment_type: Option<PaymentType>,
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<String>,
    pub reminder_count: Option<i32>,
    pub last_reminder: Option<i64>,
    pub next_reminder: Option<i64>,
}

/// Sort keys accepted by the booking list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TourMemberSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    TotalCost,
    MemberCount,
}

impl TourMemberSort {
    /// Column name for ORDER BY; the closed enum keeps user input out of SQL.
    pub const fn column(&self) -> &'static str {
        match self {
            TourMemberSort::CreatedAt => "created_at",
            TourMemberSort::UpdatedAt => "updated_at",
            TourMemberSort::TotalCost => "total_cost",
            TourMemberSort::MemberCount => "member_count",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub const fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Booking list filters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourMemberFilter {
    pub payment_status: Option<PaymentStatus>,
    pub payment_type: Option<PaymentType>,
    pub tour_package_id: Option<i64>,
    /// Booking status; listing defaults to BOOKED when absent
    pub status: Option<String>,
    /// Substring match on package name
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: TourMemberSort,
    #[serde(default)]
    pub sort_order: SortOrder,
}

/// Filters for the payment-reminder listing (non-PAID bookings).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderFilter {
    /// Substring match on member name, mobile number or package name
    pub search: Option<String>,
    pub tour_package_id: Option<i64>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_type: Option<PaymentType>,
    /// Booking creation range, Unix milliseconds
    pub from_date: Option<i64>,
    pub to_date: Option<i64>,
}

/// Aggregate figures for the booking stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TourMemberStats {
    pub total_bookings: i64,
    pub pending_payments: i64,
    pub partial_payments: i64,
    pub paid_bookings: i64,
    pub total_revenue: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn fully_paid() {
        assert_eq!(
            derive_payment_status(dec(1000), dec(1000)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn overpaid_is_still_paid() {
        assert_eq!(
            derive_payment_status(dec(1200), dec(1000)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn partial_payment() {
        assert_eq!(
            derive_payment_status(dec(500), dec(1000)),
            PaymentStatus::Partial
        );
    }

    #[test]
    fn nothing_paid() {
        assert_eq!(
            derive_payment_status(Decimal::ZERO, dec(1000)),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn zero_cost_booking_counts_as_paid() {
        // sum (0) >= total (0) — the >= branch wins over the sum == 0 branch
        assert_eq!(
            derive_payment_status(Decimal::ZERO, Decimal::ZERO),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn decimal_boundary_is_exact() {
        let total = Decimal::new(99_999, 2); // 999.99
        let paid = Decimal::new(99_999, 2);
        assert_eq!(derive_payment_status(paid, total), PaymentStatus::Paid);
        let one_paisa_short = Decimal::new(99_998, 2);
        assert_eq!(
            derive_payment_status(one_paisa_short, total),
            PaymentStatus::Partial
        );
    }

    #[test]
    fn sort_columns_are_fixed() {
        assert_eq!(TourMemberSort::TotalCost.column(), "total_cost");
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
    }

    #[test]
    fn payment_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentType::OneTime).unwrap(),
            "\"ONE_TIME\""
        );
        let t: PaymentType = serde_json::from_str("\"EMI\"").unwrap();
        assert_eq!(t, PaymentType::Emi);
    }
}
