//! Demo data for local development.
//!
//! Seeds a handful of authors and posts with overlapping authorship so the
//! posts endpoint has something to sort and filter. Only runs when the users
//! table is empty, so re-runs leave existing data alone.

use anyhow::Result;
use tracing::{debug, info};

use super::{CreatePost, Database};

/// Result of running the demo seed.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub users_created: usize,
    pub posts_created: usize,
    pub skipped: bool,
}

struct DemoPost {
    text: &'static str,
    likes: i64,
    reads: i64,
    popularity: f64,
    tags: &'static [&'static str],
    /// Indexes into DEMO_USERS
    authors: &'static [usize],
}

const DEMO_USERS: &[&str] = &["thomas", "santiago", "ashley", "julia", "cheng"];

const DEMO_POSTS: &[DemoPost] = &[
    DemoPost {
        text: "Excepteur occaecat minim reprehenderit cupidatat dolore voluptate velit labore.",
        likes: 469,
        reads: 7534,
        popularity: 0.19,
        tags: &["science", "tech"],
        authors: &[0],
    },
    DemoPost {
        text: "Ea cillum incididunt consequat ullamco nisi aute labore cupidatat exercitation.",
        likes: 735,
        reads: 8504,
        popularity: 0.76,
        tags: &["history", "politics"],
        authors: &[0, 1],
    },
    DemoPost {
        text: "Proident tempor est nulla irure ad est labore deserunt ut commodo.",
        likes: 12,
        reads: 90406,
        popularity: 0.42,
        tags: &["culture", "design"],
        authors: &[1],
    },
    DemoPost {
        text: "Ullamco occaecat exercitation cillum est laboris veniam ad sint.",
        likes: 103,
        reads: 8,
        popularity: 0.97,
        tags: &["tech"],
        authors: &[2, 3],
    },
];

/// Seed demo users and posts unless any user already exists.
pub async fn run_demo_seed(db: &Database) -> Result<SeedResult> {
    let users = db.users();
    if users.count().await? > 0 {
        debug!("Users present, skipping demo seed");
        return Ok(SeedResult {
            skipped: true,
            ..Default::default()
        });
    }

    let mut result = SeedResult::default();
    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for username in DEMO_USERS {
        user_ids.push(users.create(username).await?.id);
        result.users_created += 1;
    }

    let posts = db.posts();
    for demo in DEMO_POSTS {
        posts
            .create(CreatePost {
                text: demo.text.to_string(),
                likes: demo.likes,
                reads: demo.reads,
                popularity: demo.popularity,
                tags: demo.tags.iter().map(|t| t.to_string()).collect(),
                author_ids: demo.authors.iter().map(|&i| user_ids[i]).collect(),
            })
            .await?;
        result.posts_created += 1;
    }

    info!(
        users = result.users_created,
        posts = result.posts_created,
        "Demo seed complete"
    );
    Ok(result)
}
