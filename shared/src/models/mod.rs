//! Domain models and request payloads
//!
//! Wire format is camelCase JSON; database rows map by snake_case field name
//! through `sqlx::FromRow` (gated behind the `db` feature).

pub mod enquiry;
pub mod member;
pub mod payment;
pub mod role;
pub mod tour_member;
pub mod tour_package;
pub mod user;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Money fields must not be negative.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative").with_message("must not be negative".into()));
    }
    Ok(())
}

/// Payment amounts must be strictly positive.
pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("not_positive")
            .with_message("must be greater than zero".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_accepts_zero() {
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::from(10)).is_ok());
        assert!(non_negative(&Decimal::from(-1)).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(positive(&Decimal::ONE).is_ok());
        assert!(positive(&Decimal::ZERO).is_err());
        assert!(positive(&Decimal::from(-5)).is_err());
    }
}
