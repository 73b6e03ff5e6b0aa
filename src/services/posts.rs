//! Post lookup by author
//!
//! Sits between the HTTP handler and the repositories: collapses duplicate
//! author IDs, rejects requests where no author exists, then loads the posts.

use thiserror::Error;
use tracing::debug;

use crate::db::{Database, PostRecord, PostSort};

#[derive(Debug, Error)]
pub enum PostQueryError {
    /// None of the requested author IDs belongs to a user
    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct PostService {
    db: Database,
}

impl PostService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Posts written by any of `author_ids`. Unknown IDs are ignored as long as
    /// at least one ID matches a user.
    pub async fn get_posts(
        &self,
        author_ids: &[i64],
        sort: PostSort,
    ) -> Result<Vec<PostRecord>, PostQueryError> {
        let mut unique_ids = author_ids.to_vec();
        unique_ids.sort_unstable();
        unique_ids.dedup();

        let existing = self.db.users().find_existing_ids(&unique_ids).await?;
        if existing.is_empty() {
            debug!(author_ids = ?unique_ids, "No requested author exists");
            return Err(PostQueryError::UserNotFound);
        }

        let posts = self.db.posts().find_by_author_ids(&existing, sort).await?;
        Ok(posts)
    }
}
