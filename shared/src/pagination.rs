//! Pagination contract shared by every listing endpoint
//!
//! `page` and `limit` are 1-based positive integers; `limit` is capped at
//! [`MAX_LIMIT`]. Responses carry the total row count and
//! `total_pages = ceil(total / limit)`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Hard cap on page size.
pub const MAX_LIMIT: i64 = 100;

const DEFAULT_LIMIT: i64 = 10;

/// Query-string pagination parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageQuery {
    /// Reject out-of-range values before any query runs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page < 1 {
            return Err(AppError::validation("page must be a positive integer"));
        }
        if self.limit < 1 {
            return Err(AppError::validation("limit must be a positive integer"));
        }
        if self.limit > MAX_LIMIT {
            return Err(AppError::validation(format!(
                "limit must not exceed {MAX_LIMIT}"
            )));
        }
        Ok(())
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, query: PageQuery) -> Self {
        Self {
            data,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total_pages(total, query.limit),
        }
    }
}

/// `ceil(total / limit)`, zero when the result set is empty.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let q = PageQuery::default();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn offset_is_one_based() {
        let q = PageQuery { page: 2, limit: 10 };
        // page 2 with limit 10 covers rows 11..=20
        assert_eq!(q.offset(), 10);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 100), 1);
    }

    #[test]
    fn limit_above_cap_rejected() {
        let q = PageQuery {
            page: 1,
            limit: 150,
        };
        let err = q.validate().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationFailed);
    }

    #[test]
    fn zero_and_negative_rejected() {
        assert!(PageQuery { page: 0, limit: 10 }.validate().is_err());
        assert!(PageQuery { page: 1, limit: 0 }.validate().is_err());
        assert!(PageQuery { page: -1, limit: 10 }.validate().is_err());
    }

    #[test]
    fn cap_boundary_accepted() {
        assert!(
            PageQuery {
                page: 1,
                limit: 100
            }
            .validate()
            .is_ok()
        );
    }
}
