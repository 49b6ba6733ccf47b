//! Payment model and payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status of a single payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "payment_txn_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTxnStatus {
    Pending,
    Paid,
    Failed,
}

/// Payment against a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub tour_member_id: i64,
    pub amount: Decimal,
    pub payment_method: String,
    pub note: Option<String>,
    pub status: PaymentTxnStatus,
    pub created_by_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Payment creation payload. Status defaults to PAID.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreate {
    #[validate(custom(function = "super::positive"))]
    pub amount: Decimal,
    #[validate(length(min = 1, message = "payment method is required"))]
    pub payment_method: String,
    pub note: Option<String>,
    #[serde(default = "default_paid")]
    pub status: PaymentTxnStatus,
}

fn default_paid() -> PaymentTxnStatus {
    PaymentTxnStatus::Paid
}

/// Partial payment update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    #[validate(custom(function = "super::positive"))]
    pub amount: Option<Decimal>,
    #[validate(length(min = 1, message = "payment method must not be empty"))]
    pub payment_method: Option<String>,
    pub note: Option<String>,
    pub status: Option<PaymentTxnStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_defaults_to_paid() {
        let p: PaymentCreate =
            serde_json::from_str(r#"{"amount":"500","paymentMethod":"cash"}"#).unwrap();
        assert_eq!(p.status, PaymentTxnStatus::Paid);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn zero_amount_rejected() {
        let p = PaymentCreate {
            amount: Decimal::ZERO,
            payment_method: "cash".into(),
            note: None,
            status: PaymentTxnStatus::Paid,
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&PaymentTxnStatus::Failed).unwrap(),
            "\"FAILED\""
        );
    }
}
