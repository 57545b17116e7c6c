use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, status, created_at, updated_at";

pub async fn find_active_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1 AND status = 'ACTIVE'",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_active_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1 AND status = 'ACTIVE'",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Uniqueness spans all lifecycle states: a deleted user still holds its
/// email.
pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn insert(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, name, email, password_hash, role, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role)
    .bind(user.status)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(pool)
    .await
}
