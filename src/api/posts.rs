//! Posts REST endpoint
//!
//! `GET /api/posts?authorIds=1,2&sortBy=likes&direction=desc`
//!
//! Query parameters are validated before any database work. `sortBy` and
//! `direction` fall back to `id` / `asc` when absent or empty, but any other
//! value must match an allowed spelling exactly.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::middleware::require_auth;
use crate::AppState;
use crate::db::{PostRecord, PostSort, SortDirection, SortField};
use crate::services::AuthUser;

/// Raw query string, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsQuery {
    pub author_ids: Option<String>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

/// Query after validation: at least one author ID, and a concrete ordering
#[derive(Debug, Clone, PartialEq)]
pub struct PostsRequest {
    pub author_ids: Vec<i64>,
    pub sort: PostSort,
}

impl TryFrom<PostsQuery> for PostsRequest {
    type Error = ApiError;

    fn try_from(query: PostsQuery) -> Result<Self, Self::Error> {
        let author_ids = query
            .author_ids
            .as_deref()
            .and_then(parse_author_ids)
            .ok_or(ApiError::InvalidQuery)?;

        let field = parse_or_default(query.sort_by.as_deref(), SortField::from_param)
            .ok_or(ApiError::InvalidQuery)?;
        let direction = parse_or_default(query.direction.as_deref(), SortDirection::from_param)
            .ok_or(ApiError::InvalidQuery)?;

        Ok(Self {
            author_ids,
            sort: PostSort::new(field, direction),
        })
    }
}

/// Parse a comma-separated list of non-negative integers. Each entry may be
/// padded with whitespace; an empty entry anywhere invalidates the list.
fn parse_author_ids(raw: &str) -> Option<Vec<i64>> {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse::<i64>().ok()
        })
        .collect()
}

/// Absent or empty selects the default; anything else must parse.
fn parse_or_default<T: Default>(value: Option<&str>, parse: fn(&str) -> Option<T>) -> Option<T> {
    match value {
        None | Some("") => Some(T::default()),
        Some(v) => parse(v),
    }
}

/// Public shape of a post. Authorship is deliberately not exposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostResponse {
    pub id: i64,
    pub likes: i64,
    pub popularity: f64,
    pub reads: i64,
    pub tags: Vec<String>,
    pub text: String,
}

impl From<PostRecord> for PostResponse {
    fn from(post: PostRecord) -> Self {
        let PostRecord {
            id,
            text,
            likes,
            reads,
            popularity,
            tags,
        } = post;

        Self {
            id,
            likes,
            popularity,
            reads,
            tags,
            text,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostsEnvelope {
    pub posts: Vec<PostResponse>,
}

/// List posts by one or more authors
async fn get_posts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<Json<PostsEnvelope>, ApiError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "Unparseable posts query");
        ApiError::InvalidQuery
    })?;

    let request = PostsRequest::try_from(query).inspect_err(|_| {
        tracing::debug!(user_id = user.user_id, "Rejected posts query");
    })?;

    let posts = state
        .posts
        .get_posts(&request.author_ids, request.sort)
        .await?;

    tracing::info!(
        user_id = user.user_id,
        author_ids = ?request.author_ids,
        sort_by = %request.sort.field,
        direction = %request.sort.direction,
        count = posts.len(),
        "Listed posts"
    );

    Ok(Json(PostsEnvelope {
        posts: posts.into_iter().map(PostResponse::from).collect(),
    }))
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/posts", get(get_posts))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
