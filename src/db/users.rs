//! Users repository
//!
//! Users only matter here as post authors: the posts endpoint checks that at
//! least one requested author exists before querying posts.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool as Pool;

use super::sqlite_helpers::{in_placeholders, now_iso8601};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

pub struct UsersRepository {
    pool: Pool,
}

impl UsersRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, username: &str) -> Result<UserRecord> {
        let now = now_iso8601();

        let id = sqlx::query("INSERT INTO users (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(&now)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserRecord {
            id: r.0,
            username: r.1,
            created_at: r.2,
        }))
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, created_at FROM users WHERE username = ? COLLATE NOCASE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserRecord {
            id: r.0,
            username: r.1,
            created_at: r.2,
        }))
    }

    /// Return which of `ids` belong to existing users, in ascending order
    pub async fn find_existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id FROM users WHERE id IN ({}) ORDER BY id",
            in_placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, (i64,)>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Count all users
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
