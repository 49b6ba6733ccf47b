//! Enquiry (pre-sale lead) model and payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Enquiry workflow state. Any state may move to any other; the only rule is
/// membership in this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "enquiry_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnquiryStatus {
    Pending,
    Booked,
    NotInterested,
}

/// Enquiry form entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub purpose: Option<String>,
    pub status: EnquiryStatus,
    pub created_by_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Enquiry creation payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    pub purpose: Option<String>,
    pub status: Option<EnquiryStatus>,
}

/// Partial enquiry update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<EnquiryStatus>,
}

/// Status-only update. The status arrives as a raw string so an unknown
/// value can be reported as a 400 with its own error code instead of a
/// body-shape rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct EnquiryStatusUpdate {
    pub status: String,
}

impl EnquiryStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EnquiryStatus::Pending => "PENDING",
            EnquiryStatus::Booked => "BOOKED",
            EnquiryStatus::NotInterested => "NOT_INTERESTED",
        }
    }
}

impl std::str::FromStr for EnquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EnquiryStatus::Pending),
            "BOOKED" => Ok(EnquiryStatus::Booked),
            "NOT_INTERESTED" => Ok(EnquiryStatus::NotInterested),
            other => Err(format!("unknown enquiry status: {other}")),
        }
    }
}

/// Counts per enquiry status.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct EnquiryStats {
    pub total: i64,
    pub pending: i64,
    pub booked: i64,
    pub not_interested: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_format() {
        assert_eq!(
            serde_json::to_string(&EnquiryStatus::NotInterested).unwrap(),
            "\"NOT_INTERESTED\""
        );
    }

    #[test]
    fn unknown_status_rejected_at_parse() {
        assert!("ARCHIVED".parse::<EnquiryStatus>().is_err());
    }

    #[test]
    fn any_known_status_parses() {
        for s in ["PENDING", "BOOKED", "NOT_INTERESTED"] {
            let status: EnquiryStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
    }
}
