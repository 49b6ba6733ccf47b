//! Dashboard handlers (read-only reporting)

use axum::extract::State;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};

use crate::api::extract::Query;
use crate::db;
use crate::db::dashboard::{DashboardOverview, PopularPackage, RecentBooking, RevenueTrend};
use crate::error::ServiceResult;
use crate::state::AppState;

const MAX_WINDOW: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MonthsQuery {
    pub months: Option<i64>,
}

pub async fn overview(
    State(state): State<AppState>,
) -> ServiceResult<ApiResponse<DashboardOverview>> {
    let overview = db::dashboard::overview(&state.pool).await?;
    Ok(ApiResponse::ok("Dashboard overview fetched successfully", overview))
}

pub async fn recent_bookings(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ServiceResult<ApiResponse<Vec<RecentBooking>>> {
    let limit = bounded(query.limit, 5)?;
    let bookings = db::dashboard::recent_bookings(&state.pool, limit).await?;
    Ok(ApiResponse::ok("Recent bookings fetched successfully", bookings))
}

pub async fn revenue_trends(
    State(state): State<AppState>,
    Query(query): Query<MonthsQuery>,
) -> ServiceResult<ApiResponse<Vec<RevenueTrend>>> {
    let months = bounded(query.months, 6)?;
    let trends = db::dashboard::revenue_trends(&state.pool, months).await?;
    Ok(ApiResponse::ok("Revenue trends fetched successfully", trends))
}

pub async fn popular_packages(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ServiceResult<ApiResponse<Vec<PopularPackage>>> {
    let limit = bounded(query.limit, 5)?;
    let packages = db::dashboard::popular_packages(&state.pool, limit).await?;
    Ok(ApiResponse::ok("Popular packages fetched successfully", packages))
}

fn bounded(value: Option<i64>, default: i64) -> Result<i64, AppError> {
    let value = value.unwrap_or(default);
    if value < 1 || value > MAX_WINDOW {
        return Err(AppError::validation(format!(
            "value must be between 1 and {MAX_WINDOW}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_applies_default_and_limits() {
        assert_eq!(bounded(None, 5).unwrap(), 5);
        assert_eq!(bounded(Some(12), 5).unwrap(), 12);
        assert!(bounded(Some(0), 5).is_err());
        assert!(bounded(Some(101), 5).is_err());
    }
}
