use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::RecordStatus;

/// Task row as stored in the database. `user_id` is the single source of
/// truth for ownership; "a user's tasks" is always a query, never a
/// stored back-reference.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// New ACTIVE task owned by `user_id`.
    pub fn new(title: String, description: String, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            user_id,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating or replacing a task. The owner is named in the
/// body because only leaders may mutate tasks, on any user's behalf.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 1000))]
    pub description: String,

    pub user_id: Uuid,
}

/// Task shape returned by the API. Status is omitted: DELETED tasks are
/// never returned, so it would always read ACTIVE.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            user_id: task.user_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Query parameters for the title-search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive substring to match against task titles.
    pub title: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_dir")]
    pub sort_dir: String,
}

fn default_page_size() -> u32 {
    10
}

fn default_sort_by() -> String {
    "title".to_string()
}

fn default_sort_dir() -> String {
    "asc".to_string()
}
