//! Tour package queries

use shared::error::{AppError, ErrorCode};
use shared::models::tour_package::{
    TourPackage, TourPackageCreate, TourPackageFilter, TourPackageStats, TourPackageUpdate,
};
use shared::pagination::{PageQuery, Paginated};
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::ServiceResult;

const PACKAGE_COLUMNS: &str = "id, package_name, \"desc\", tour_price, total_seat, cover_photo, \
                               created_by_id, created_at, updated_at";

/// Insert a package. The id is generated by the caller so the cover photo
/// can land under the package's directory before the row exists.
pub async fn create(
    pool: &PgPool,
    id: i64,
    payload: &TourPackageCreate,
    cover_photo: Option<&str>,
    created_by: i64,
) -> ServiceResult<TourPackage> {
    let now = now_millis();
    let package = sqlx::query_as::<_, TourPackage>(&format!(
        "INSERT INTO tour_packages \
            (id, package_name, \"desc\", tour_price, total_seat, cover_photo, created_by_id, \
             created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {PACKAGE_COLUMNS}"
    ))
    .bind(id)
    .bind(&payload.package_name)
    .bind(payload.desc.as_deref())
    .bind(payload.tour_price)
    .bind(payload.total_seat)
    .bind(cover_photo)
    .bind(created_by)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(package)
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<TourPackage> {
    sqlx::query_as::<_, TourPackage>(&format!(
        "SELECT {PACKAGE_COLUMNS} FROM tour_packages WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::TourPackageNotFound).into())
}

/// Paginated package list with name search, price/seat ranges and sorting.
pub async fn list(
    pool: &PgPool,
    filter: &TourPackageFilter,
    page: PageQuery,
) -> ServiceResult<Paginated<TourPackage>> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tour_packages WHERE 1=1");
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {PACKAGE_COLUMNS} FROM tour_packages WHERE 1=1"
    ));

    for builder in [&mut count, &mut query] {
        if let Some(search) = &filter.search {
            builder.push(" AND package_name ILIKE ");
            builder.push_bind(format!("%{search}%"));
        }
        if let Some(min) = filter.min_price {
            builder.push(" AND tour_price >= ");
            builder.push_bind(min);
        }
        if let Some(max) = filter.max_price {
            builder.push(" AND tour_price <= ");
            builder.push_bind(max);
        }
        if let Some(min) = filter.min_seats {
            builder.push(" AND total_seat >= ");
            builder.push_bind(min);
        }
        if let Some(max) = filter.max_seats {
            builder.push(" AND total_seat <= ");
            builder.push_bind(max);
        }
    }

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    // sort_by/sort_order come from closed enums, safe to splice
    query.push(format!(
        " ORDER BY {} {} LIMIT ",
        filter.sort_by.column(),
        filter.sort_order.keyword()
    ));
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let packages = query.build_query_as::<TourPackage>().fetch_all(pool).await?;
    Ok(Paginated::new(packages, total, page))
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    payload: &TourPackageUpdate,
    cover_photo: Option<&str>,
) -> ServiceResult<TourPackage> {
    sqlx::query_as::<_, TourPackage>(&format!(
        "UPDATE tour_packages SET \
            package_name = COALESCE($2, package_name), \
            \"desc\" = COALESCE($3, \"desc\"), \
            tour_price = COALESCE($4, tour_price), \
            total_seat = COALESCE($5, total_seat), \
            cover_photo = COALESCE($6, cover_photo), \
            updated_at = $7 \
         WHERE id = $1 RETURNING {PACKAGE_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.package_name.as_deref())
    .bind(payload.desc.as_deref())
    .bind(payload.tour_price)
    .bind(payload.total_seat)
    .bind(cover_photo)
    .bind(now_millis())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::TourPackageNotFound).into())
}

/// Delete a package, returning the row so stored files can be removed.
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<TourPackage> {
    sqlx::query_as::<_, TourPackage>(&format!(
        "DELETE FROM tour_packages WHERE id = $1 RETURNING {PACKAGE_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::TourPackageNotFound).into())
}

pub async fn stats(pool: &PgPool) -> ServiceResult<TourPackageStats> {
    let stats = sqlx::query_as::<_, TourPackageStats>(
        "SELECT COUNT(*) AS total_packages, \
                COALESCE(SUM(total_seat), 0)::bigint AS total_seats, \
                COALESCE(AVG(tour_price), 0) AS avg_price \
         FROM tour_packages",
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
