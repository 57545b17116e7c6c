#![allow(dead_code)]

use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Connects to the database named by DATABASE_URL and applies the
/// migrations. Returns `None` when the variable is unset or the database
/// is unreachable; callers skip the test in that case.
pub async fn try_pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .ok()?;
    sqlx::migrate!().run(&pool).await.ok()?;
    Some(pool)
}

/// Every test registers its own throwaway users so runs never collide.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

/// Registration always yields a MEMBER; tests needing the elevated role
/// promote directly in the store.
pub async fn promote_to_leader(pool: &PgPool, user_id: Uuid) {
    sqlx::query("UPDATE users SET role = 'LEADER' WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("failed to promote user to leader");
}

pub async fn soft_delete_user(pool: &PgPool, user_id: Uuid) {
    sqlx::query("UPDATE users SET status = 'DELETED' WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("failed to soft-delete user");
}
