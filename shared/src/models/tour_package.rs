//! Tour package model and payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tour package entity (a sellable product).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TourPackage {
    pub id: i64,
    pub package_name: String,
    pub desc: Option<String>,
    pub tour_price: Decimal,
    pub total_seat: i32,
    /// Path of the stored cover photo, relative to the upload root
    pub cover_photo: Option<String>,
    pub created_by_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Package creation payload (multipart `data` field; cover photo is a file).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TourPackageCreate {
    #[validate(length(min = 1, message = "package name is required"))]
    pub package_name: String,
    pub desc: Option<String>,
    #[validate(custom(function = "super::non_negative"))]
    pub tour_price: Decimal,
    #[validate(range(min = 1, message = "total seats must be at least 1"))]
    pub total_seat: i32,
}

/// Partial package update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TourPackageUpdate {
    #[validate(length(min = 1, message = "package name must not be empty"))]
    pub package_name: Option<String>,
    pub desc: Option<String>,
    #[validate(custom(function = "super::non_negative"))]
    pub tour_price: Option<Decimal>,
    #[validate(range(min = 1, message = "total seats must be at least 1"))]
    pub total_seat: Option<i32>,
}

/// Sort keys accepted by the package list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TourPackageSort {
    #[default]
    CreatedAt,
    Price,
    Seats,
}

impl TourPackageSort {
    /// Column name for ORDER BY; the closed enum keeps user input out of SQL.
    pub const fn column(&self) -> &'static str {
        match self {
            TourPackageSort::CreatedAt => "created_at",
            TourPackageSort::Price => "tour_price",
            TourPackageSort::Seats => "total_seat",
        }
    }
}

/// List filters for packages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPackageFilter {
    /// Substring match on package name
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_seats: Option<i32>,
    pub max_seats: Option<i32>,
    #[serde(default)]
    pub sort_by: TourPackageSort,
    #[serde(default)]
    pub sort_order: super::tour_member::SortOrder,
}

/// Aggregate figures for the package stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TourPackageStats {
    pub total_packages: i64,
    pub total_seats: i64,
    pub avg_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_rejects_negative_price() {
        let pkg = TourPackageCreate {
            package_name: "Ladakh 7D".into(),
            desc: None,
            tour_price: Decimal::from(-100),
            total_seat: 20,
        };
        assert!(pkg.validate().is_err());
    }

    #[test]
    fn sort_defaults_to_created_at() {
        let f: TourPackageFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(f.sort_by, TourPackageSort::CreatedAt);
        assert_eq!(TourPackageSort::Price.column(), "tour_price");
    }

    #[test]
    fn create_rejects_zero_seats() {
        let pkg = TourPackageCreate {
            package_name: "Ladakh 7D".into(),
            desc: None,
            tour_price: Decimal::from(45_000),
            total_seat: 0,
        };
        assert!(pkg.validate().is_err());
    }
}
