//! User queries

use shared::error::{AppError, ErrorCode};
use shared::models::role::UserRole;
use shared::models::user::{User, UserCreate, UserUpdate};
use shared::pagination::{PageQuery, Paginated};
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::ServiceResult;

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

/// User row including the password hash; never serialized to clients.
#[derive(sqlx::FromRow)]
pub struct UserAuthRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserAuthRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insert a new user. Fails with `EmailExists` when the email is taken.
pub async fn create(
    pool: &PgPool,
    payload: &UserCreate,
    password_hash: &str,
) -> ServiceResult<User> {
    if email_taken(pool, &payload.email, None).await? {
        return Err(AppError::new(ErrorCode::EmailExists).into());
    }

    let now = now_millis();
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, name, email, password, role, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {USER_COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(password_hash)
    .bind(payload.role.unwrap_or(UserRole::Staff))
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Fetch a user with its password hash for credential checks.
pub async fn find_by_email(pool: &PgPool, email: &str) -> ServiceResult<Option<UserAuthRow>> {
    let row = sqlx::query_as::<_, UserAuthRow>(
        "SELECT id, name, email, password, role, created_at, updated_at \
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get(pool: &PgPool, id: i64) -> ServiceResult<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).into())
}

/// Paginated user list with name/email substring search and role filter.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    role: Option<UserRole>,
    page: PageQuery,
) -> ServiceResult<Paginated<User>> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE 1=1");
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
    ));

    for builder in [&mut count, &mut query] {
        if let Some(search) = search {
            let pattern = format!("%{search}%");
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR email ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(role) = role {
            builder.push(" AND role = ");
            builder.push_bind(role);
        }
    }

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    query.push(" ORDER BY created_at DESC LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let users = query.build_query_as::<User>().fetch_all(pool).await?;
    Ok(Paginated::new(users, total, page))
}

/// All users, oldest first, for the CSV export.
pub async fn list_all(pool: &PgPool) -> ServiceResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Partial update; an email change is checked against every other user.
pub async fn update(pool: &PgPool, id: i64, payload: &UserUpdate) -> ServiceResult<User> {
    if let Some(email) = &payload.email {
        if email_taken(pool, email, Some(id)).await? {
            return Err(AppError::new(ErrorCode::EmailExists).into());
        }
    }

    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
            name = COALESCE($2, name), \
            email = COALESCE($3, email), \
            role = COALESCE($4, role), \
            updated_at = $5 \
         WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.name.as_deref())
    .bind(payload.email.as_deref())
    .bind(payload.role)
    .bind(now_millis())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).into())
}

pub async fn reset_password(pool: &PgPool, id: i64, password_hash: &str) -> ServiceResult<()> {
    let result = sqlx::query("UPDATE users SET password = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .bind(now_millis())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound).into());
    }
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound).into());
    }
    Ok(())
}

async fn email_taken(pool: &PgPool, email: &str, exclude_id: Option<i64>) -> ServiceResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::bigint IS NULL OR id <> $2))",
    )
    .bind(email)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}
