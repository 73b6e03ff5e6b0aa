//! Posts repository
//!
//! Posts are linked to their authors through the `user_posts` join table.
//! Reads always go through [`PostRepository::find_by_author_ids`], which issues a
//! single `SELECT DISTINCT` over the join so a post with several matching
//! authors is returned once.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool as Pool;

use super::sqlite_helpers::{in_placeholders, json_to_vec, now_iso8601, vec_to_json};

// ============================================================================
// Sorting
// ============================================================================

/// Column a post listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Reads,
    Likes,
    Popularity,
}

impl SortField {
    /// Parse the exact query-string spelling (`id`, `reads`, `likes`, `popularity`)
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "id" => Some(SortField::Id),
            "reads" => Some(SortField::Reads),
            "likes" => Some(SortField::Likes),
            "popularity" => Some(SortField::Popularity),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Reads => "reads",
            SortField::Likes => "likes",
            SortField::Popularity => "popularity",
        }
    }

    /// Fully-qualified column used in ORDER BY. Only these static names ever
    /// reach the SQL text.
    fn column(&self) -> &'static str {
        match self {
            SortField::Id => "posts.id",
            SortField::Reads => "posts.reads",
            SortField::Likes => "posts.likes",
            SortField::Popularity => "posts.popularity",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering of a post listing. Defaults to `id ASC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl PostSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// ORDER BY clause body. Equal keys fall back to ascending id so repeated
    /// reads return the same sequence.
    fn order_by(&self) -> String {
        format!(
            "{} {}, posts.id ASC",
            self.field.column(),
            self.direction.keyword()
        )
    }
}

// ============================================================================
// Post Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostRecord {
    pub id: i64,
    pub text: String,
    pub likes: i64,
    pub reads: i64,
    pub popularity: f64,
    pub tags: Vec<String>,
}

/// (id, text, likes, reads, popularity, tags_json)
type PostRow = (i64, String, i64, i64, f64, String);

impl From<PostRow> for PostRecord {
    fn from(r: PostRow) -> Self {
        Self {
            id: r.0,
            text: r.1,
            likes: r.2,
            reads: r.3,
            popularity: r.4,
            tags: json_to_vec(&r.5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreatePost {
    pub text: String,
    pub likes: i64,
    pub reads: i64,
    pub popularity: f64,
    pub tags: Vec<String>,
    pub author_ids: Vec<i64>,
}

// ============================================================================
// Repository
// ============================================================================

pub struct PostRepository {
    pool: Pool,
}

impl PostRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a post and link it to its authors in one transaction
    pub async fn create(&self, post: CreatePost) -> Result<PostRecord> {
        let now = now_iso8601();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO posts (text, likes, reads, popularity, tags, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.text)
        .bind(post.likes)
        .bind(post.reads)
        .bind(post.popularity)
        .bind(vec_to_json(&post.tags))
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for author_id in &post.author_ids {
            sqlx::query("INSERT OR IGNORE INTO user_posts (user_id, post_id) VALUES (?, ?)")
                .bind(*author_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create post"))
    }

    /// Link an existing post to another author. Re-linking is a no-op.
    pub async fn add_author(&self, post_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO user_posts (user_id, post_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get post by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<PostRecord>> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, text, likes, reads, popularity, tags FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostRecord::from))
    }

    /// All posts written by at least one of `author_ids`, each post once,
    /// ordered by `sort`.
    pub async fn find_by_author_ids(
        &self,
        author_ids: &[i64],
        sort: PostSort,
    ) -> Result<Vec<PostRecord>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT DISTINCT posts.id, posts.text, posts.likes, posts.reads, posts.popularity, posts.tags
            FROM posts
            JOIN user_posts ON user_posts.post_id = posts.id
            WHERE user_posts.user_id IN ({})
            ORDER BY {}
            "#,
            in_placeholders(author_ids.len()),
            sort.order_by()
        );

        let mut query = sqlx::query_as::<_, PostRow>(&sql);
        for id in author_ids {
            query = query.bind(*id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        tracing::debug!(
            author_count = author_ids.len(),
            sort_by = %sort.field,
            direction = %sort.direction,
            count = rows.len(),
            "Loaded posts by author"
        );

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }
}
