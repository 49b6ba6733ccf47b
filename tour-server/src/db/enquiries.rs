//! Enquiry queries

use shared::error::{AppError, ErrorCode};
use shared::models::enquiry::{
    Enquiry, EnquiryCreate, EnquiryStats, EnquiryStatus, EnquiryUpdate,
};
use shared::pagination::{PageQuery, Paginated};
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::ServiceResult;

const ENQUIRY_COLUMNS: &str =
    "id, name, phone, purpose, status, created_by_id, created_at, updated_at";

pub async fn create(
    pool: &PgPool,
    payload: &EnquiryCreate,
    created_by: i64,
) -> ServiceResult<Enquiry> {
    let now = now_millis();
    let enquiry = sqlx::query_as::<_, Enquiry>(&format!(
        "INSERT INTO enquiry_forms (id, name, phone, purpose, status, created_by_id, \
             created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING {ENQUIRY_COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(&payload.name)
    .bind(&payload.phone)
    .bind(payload.purpose.as_deref())
    .bind(payload.status.unwrap_or(EnquiryStatus::Pending))
    .bind(created_by)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(enquiry)
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<Enquiry> {
    sqlx::query_as::<_, Enquiry>(&format!(
        "SELECT {ENQUIRY_COLUMNS} FROM enquiry_forms WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::EnquiryNotFound).into())
}

pub async fn list(
    pool: &PgPool,
    status: Option<EnquiryStatus>,
    page: PageQuery,
) -> ServiceResult<Paginated<Enquiry>> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM enquiry_forms WHERE 1=1");
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {ENQUIRY_COLUMNS} FROM enquiry_forms WHERE 1=1"
    ));

    for builder in [&mut count, &mut query] {
        if let Some(status) = status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
    }

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    query.push(" ORDER BY created_at DESC LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let enquiries = query.build_query_as::<Enquiry>().fetch_all(pool).await?;
    Ok(Paginated::new(enquiries, total, page))
}

pub async fn update(pool: &PgPool, id: i64, payload: &EnquiryUpdate) -> ServiceResult<Enquiry> {
    sqlx::query_as::<_, Enquiry>(&format!(
        "UPDATE enquiry_forms SET \
            name = COALESCE($2, name), \
            phone = COALESCE($3, phone), \
            purpose = COALESCE($4, purpose), \
            status = COALESCE($5, status), \
            updated_at = $6 \
         WHERE id = $1 RETURNING {ENQUIRY_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.name.as_deref())
    .bind(payload.phone.as_deref())
    .bind(payload.purpose.as_deref())
    .bind(payload.status)
    .bind(now_millis())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::EnquiryNotFound).into())
}

/// Status-only transition; any status in the set may move to any other. The
/// acting user is recorded on the row.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    status: EnquiryStatus,
    updated_by: i64,
) -> ServiceResult<Enquiry> {
    sqlx::query_as::<_, Enquiry>(&format!(
        "UPDATE enquiry_forms SET status = $2, created_by_id = $3, updated_at = $4 \
         WHERE id = $1 RETURNING {ENQUIRY_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(updated_by)
    .bind(now_millis())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::EnquiryNotFound).into())
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let result = sqlx::query("DELETE FROM enquiry_forms WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::EnquiryNotFound).into());
    }
    Ok(())
}

pub async fn stats(pool: &PgPool) -> ServiceResult<EnquiryStats> {
    let stats = sqlx::query_as::<_, EnquiryStats>(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE status = 'PENDING') AS pending, \
                COUNT(*) FILTER (WHERE status = 'BOOKED') AS booked, \
                COUNT(*) FILTER (WHERE status = 'NOT_INTERESTED') AS not_interested \
         FROM enquiry_forms",
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
