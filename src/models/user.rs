use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Authorization role checked at the endpoint boundary.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Default role for newly registered users. May read tasks.
    Member,
    /// Elevated role. May create, update and delete tasks.
    Leader,
}

/// Lifecycle status shared by users and tasks.
/// Corresponds to the `record_status` SQL enum. DELETED records are
/// retained in the store but invisible to every normal read.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "record_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Active,
    Deleted,
}

/// User row as stored in the database. Never serialized to clients
/// directly; responses go through [`UserResponse`], which drops the
/// password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Normalized (trimmed, lowercased) before storage and lookup.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New ACTIVE user with the lowest-privilege role.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: Role::Member,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User shape returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
