//! Member (customer) queries

use shared::error::{AppError, ErrorCode};
use shared::models::member::{DocumentMeta, Member, MemberCreate};
use shared::pagination::{PageQuery, Paginated};
use shared::util::now_millis;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::ServiceResult;

const MEMBER_COLUMNS: &str = "id, name, mobile_no, address, documents, created_at, updated_at";

/// Insert a member. The id is generated by the caller so uploaded files can
/// land under the member's directory before the row exists.
pub async fn create(
    pool: &PgPool,
    id: i64,
    payload: &MemberCreate,
    documents: &[DocumentMeta],
) -> ServiceResult<Member> {
    let now = now_millis();
    let member = sqlx::query_as::<_, Member>(&format!(
        "INSERT INTO members (id, name, mobile_no, address, documents, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {MEMBER_COLUMNS}"
    ))
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.mobile_no)
    .bind(payload.address.as_deref())
    .bind(Json(documents))
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(member)
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<Member> {
    sqlx::query_as::<_, Member>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound).into())
}

/// Paginated member list with name / mobile number substring filters.
pub async fn list(
    pool: &PgPool,
    name: Option<&str>,
    mobile_no: Option<&str>,
    page: PageQuery,
) -> ServiceResult<Paginated<Member>> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM members WHERE 1=1");
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {MEMBER_COLUMNS} FROM members WHERE 1=1"
    ));

    for builder in [&mut count, &mut query] {
        if let Some(name) = name {
            builder.push(" AND name ILIKE ");
            builder.push_bind(format!("%{name}%"));
        }
        if let Some(mobile) = mobile_no {
            builder.push(" AND mobile_no LIKE ");
            builder.push_bind(format!("%{mobile}%"));
        }
    }

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    query.push(" ORDER BY created_at DESC LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let members = query.build_query_as::<Member>().fetch_all(pool).await?;
    Ok(Paginated::new(members, total, page))
}

/// Write the member's scalar fields and its full documents list.
pub async fn update(
    pool: &PgPool,
    id: i64,
    name: Option<&str>,
    mobile_no: Option<&str>,
    address: Option<&str>,
    documents: &[DocumentMeta],
) -> ServiceResult<Member> {
    sqlx::query_as::<_, Member>(&format!(
        "UPDATE members SET \
            name = COALESCE($2, name), \
            mobile_no = COALESCE($3, mobile_no), \
            address = COALESCE($4, address), \
            documents = $5, \
            updated_at = $6 \
         WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(mobile_no)
    .bind(address)
    .bind(Json(documents))
    .bind(now_millis())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound).into())
}

/// Delete a member, returning the row so the caller can remove stored files.
/// Join rows on bookings cascade.
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<Member> {
    sqlx::query_as::<_, Member>(&format!(
        "DELETE FROM members WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound).into())
}
