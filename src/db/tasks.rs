use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Page, Task};

const TASK_COLUMNS: &str = "id, title, description, user_id, status, created_at, updated_at";

pub async fn find_all_active(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE status = 'ACTIVE' ORDER BY created_at DESC",
        TASK_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_active_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND status = 'ACTIVE'",
        TASK_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_all_active_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE user_id = $1 AND status = 'ACTIVE' ORDER BY created_at DESC",
        TASK_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_active_by_id_and_user(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2 AND status = 'ACTIVE'",
        TASK_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Case-insensitive substring match on title over ACTIVE tasks, scoped
/// to an owner when `user_id` is given. Returns a full page envelope.
pub async fn search_active_by_title(
    pool: &PgPool,
    title: &str,
    user_id: Option<Uuid>,
    page: u32,
    size: u32,
    sort_by: &str,
    sort_dir: &str,
) -> Result<Page<Task>, sqlx::Error> {
    let size = size.clamp(1, 100);
    let pattern = format!("%{}%", title);
    let order = sort_clause(sort_by, sort_dir);
    let limit = i64::from(size);
    let offset = i64::from(page) * limit;

    let (total, rows) = match user_id {
        Some(user_id) => {
            let total = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM tasks
                 WHERE status = 'ACTIVE' AND title ILIKE $1 AND user_id = $2",
            )
            .bind(&pattern)
            .bind(user_id)
            .fetch_one(pool)
            .await?;

            let rows = sqlx::query_as::<_, Task>(&format!(
                "SELECT {} FROM tasks
                 WHERE status = 'ACTIVE' AND title ILIKE $1 AND user_id = $2
                 ORDER BY {} LIMIT $3 OFFSET $4",
                TASK_COLUMNS, order
            ))
            .bind(&pattern)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

            (total, rows)
        }
        None => {
            let total = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM tasks WHERE status = 'ACTIVE' AND title ILIKE $1",
            )
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

            let rows = sqlx::query_as::<_, Task>(&format!(
                "SELECT {} FROM tasks
                 WHERE status = 'ACTIVE' AND title ILIKE $1
                 ORDER BY {} LIMIT $2 OFFSET $3",
                TASK_COLUMNS, order
            ))
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

            (total, rows)
        }
    };

    Ok(Page::new(rows, page, size, total))
}

pub async fn insert(pool: &PgPool, task: &Task) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, user_id, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.user_id)
    .bind(task.status)
    .bind(task.created_at)
    .bind(task.updated_at)
    .fetch_one(pool)
    .await
}

/// Soft delete: the row is retained, only its status flips. Returns the
/// number of rows transitioned (0 when the task was already inactive).
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    sqlx::query("UPDATE tasks SET status = 'DELETED', updated_at = now() WHERE id = $1 AND status = 'ACTIVE'")
        .bind(id)
        .execute(pool)
        .await
        .map(|result| result.rows_affected())
}

/// Sort fields are whitelisted; anything unrecognized falls back to
/// title ascending rather than reaching the query text.
fn sort_clause(sort_by: &str, sort_dir: &str) -> String {
    let column = match sort_by {
        "created_at" => "created_at",
        "updated_at" => "updated_at",
        _ => "title",
    };
    let direction = if sort_dir.eq_ignore_ascii_case("desc") {
        "DESC"
    } else {
        "ASC"
    };
    format!("{} {}", column, direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_clause_whitelist() {
        assert_eq!(sort_clause("title", "asc"), "title ASC");
        assert_eq!(sort_clause("created_at", "DESC"), "created_at DESC");
        assert_eq!(sort_clause("updated_at", "desc"), "updated_at DESC");
        // unknown column and direction fall back to defaults
        assert_eq!(sort_clause("password_hash; DROP TABLE tasks", "up"), "title ASC");
    }
}
