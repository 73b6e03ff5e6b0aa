//! End-to-end tests for `GET /api/posts`
//!
//! Requests go through the full router (auth middleware, validation, service,
//! repository) against an in-memory SQLite database.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use blog_posts_api::config::Config;
use blog_posts_api::db::{CreatePost, Database};
use blog_posts_api::{AppState, build_app};

const AUTH_HEADER: &str = "x-access-token";

// ============================================================================
// Fixtures
// ============================================================================

struct TestApp {
    router: Router,
    token: String,
}

/// Authors: thomas=1, santiago=2, ashley=3, julia=4, cheng=5 (no posts).
///
/// | post | likes | reads | popularity | authors        |
/// |------|-------|-------|------------|----------------|
/// | 1    | 469   | 7534  | 0.19       | thomas         |
/// | 2    | 735   | 8504  | 0.76       | thomas, santiago |
/// | 3    | 12    | 90406 | 0.42       | santiago       |
/// | 4    | 103   | 8     | 0.97       | ashley, julia  |
/// | 5    | 469   | 300   | 0.05       | santiago, ashley |
/// | 6    | 0     | 1     | 0.50       | julia          |
async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();

    let users = db.users();
    let mut ids = Vec::new();
    for name in ["thomas", "santiago", "ashley", "julia", "cheng"] {
        ids.push(users.create(name).await.unwrap().id);
    }
    let (thomas, santiago, ashley, julia) = (ids[0], ids[1], ids[2], ids[3]);

    let posts = [
        (469, 7534, 0.19, vec!["science", "tech"], vec![thomas]),
        (735, 8504, 0.76, vec!["history"], vec![thomas, santiago]),
        (12, 90406, 0.42, vec!["culture", "design"], vec![santiago]),
        (103, 8, 0.97, vec!["tech"], vec![ashley, julia]),
        (469, 300, 0.05, vec!["health"], vec![santiago, ashley]),
        (0, 1, 0.5, vec![], vec![julia]),
    ];
    for (i, (likes, reads, popularity, tags, author_ids)) in posts.into_iter().enumerate() {
        db.posts()
            .create(CreatePost {
                text: format!("Post number {}", i + 1),
                likes,
                reads,
                popularity,
                tags: tags.into_iter().map(String::from).collect(),
                author_ids,
            })
            .await
            .unwrap();
    }

    let santiago_user = users.get_by_id(santiago).await.unwrap().unwrap();
    let config = Config {
        jwt_secret: "test-secret".to_string(),
        ..Default::default()
    };
    let state = AppState::new(config, db);
    let token = state.auth.issue_access_token(&santiago_user).unwrap();

    TestApp {
        router: build_app(state),
        token,
    }
}

impl TestApp {
    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header(AUTH_HEADER, &self.token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn get_raw(&self, uri: &str) -> Vec<u8> {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(AUTH_HEADER, &self.token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }
}

fn post_ids(body: &Value) -> Vec<i64> {
    body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

fn field_values(body: &Value, field: &str) -> Vec<f64> {
    body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p[field].as_f64().unwrap())
        .collect()
}

fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app().await;

    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/posts?authorIds=1,2&sortBy=likes&direction=desc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = test_app().await;

    let (status, _) = app
        .send(
            Request::builder()
                .uri("/api/posts?authorIds=1,2&sortBy=likes&direction=desc")
                .header(AUTH_HEADER, "invalid@Token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_runs_before_validation() {
    let app = test_app().await;

    let (status, _) = app
        .send(
            Request::builder()
                .uri("/api/posts?authorIds=-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_accepted() {
    let app = test_app().await;

    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/posts?authorIds=2")
                .header("authorization", format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&body), vec![2, 3, 5]);
}

// ============================================================================
// Filtering
// ============================================================================

#[tokio::test]
async fn test_single_author() {
    let app = test_app().await;

    let (status, body) = app.get("/api/posts?authorIds=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&body), vec![2, 3, 5]);
}

#[tokio::test]
async fn test_multiple_authors_union_without_duplicates() {
    let app = test_app().await;

    let (status, body) = app.get("/api/posts?authorIds=1,2").await;
    assert_eq!(status, StatusCode::OK);
    // Post 2 has both authors but appears once
    assert_eq!(post_ids(&body), vec![1, 2, 3, 5]);

    let (status, body) = app.get("/api/posts?authorIds=3,2,1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&body), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_repeated_author_id() {
    let app = test_app().await;

    let (status, body) = app.get("/api/posts?authorIds=2,2,%202").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&body), vec![2, 3, 5]);
}

#[tokio::test]
async fn test_unknown_author_mixed_with_known() {
    let app = test_app().await;

    let (status, body) = app.get("/api/posts?authorIds=2,999").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&body), vec![2, 3, 5]);
}

#[tokio::test]
async fn test_known_author_without_posts() {
    let app = test_app().await;

    let (status, body) = app.get("/api/posts?authorIds=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "posts": [] }));
}

#[tokio::test]
async fn test_all_unknown_authors_not_found() {
    let app = test_app().await;

    let (status, body) = app.get("/api/posts?authorIds=666,999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));
}

#[tokio::test]
async fn test_response_shape() {
    let app = test_app().await;

    let (status, body) = app.get("/api/posts?authorIds=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "posts": [
                {
                    "id": 1,
                    "likes": 469,
                    "popularity": 0.19,
                    "reads": 7534,
                    "tags": ["science", "tech"],
                    "text": "Post number 1"
                },
                {
                    "id": 2,
                    "likes": 735,
                    "popularity": 0.76,
                    "reads": 8504,
                    "tags": ["history"],
                    "text": "Post number 2"
                }
            ]
        })
    );
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_invalid_parameters_rejected() {
    let app = test_app().await;

    let cases = [
        "/api/posts",
        "/api/posts?authorIds=",
        "/api/posts?authorIds=%20",
        "/api/posts?authorIds=-111",
        "/api/posts?authorIds=invalid%40Id",
        "/api/posts?authorIds=1,2,invalid%40Id",
        "/api/posts?authorIds=1,,2",
        "/api/posts?authorIds=2&sortBy=%20",
        "/api/posts?authorIds=2&sortBy=name",
        "/api/posts?authorIds=2&sortBy=like",
        "/api/posts?authorIds=1,2&direction=%20",
        "/api/posts?authorIds=1,2&direction=up",
        "/api/posts?authorIds=1,2&direction=ASC",
    ];

    for uri in cases {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "error": "Invalid query parameters" }), "{uri}");
    }
}

#[tokio::test]
async fn test_invalid_parameters_checked_before_author_lookup() {
    let app = test_app().await;

    // Unknown authors would be a 404, but the bad sortBy wins
    let (status, _) = app.get("/api/posts?authorIds=666&sortBy=bogus").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Sorting
// ============================================================================

#[tokio::test]
async fn test_default_sort_is_id_ascending() {
    let app = test_app().await;

    for uri in [
        "/api/posts?authorIds=2,1",
        "/api/posts?authorIds=2,1&sortBy=",
        "/api/posts?authorIds=2,1&direction=",
        "/api/posts?authorIds=2,1&sortBy=id&direction=asc",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(post_ids(&body), vec![1, 2, 3, 5], "{uri}");
    }
}

#[tokio::test]
async fn test_sort_by_id_descending() {
    let app = test_app().await;

    let (_, body) = app.get("/api/posts?authorIds=1,2&sortBy=id&direction=desc").await;

    assert_eq!(post_ids(&body), vec![5, 3, 2, 1]);
}

#[tokio::test]
async fn test_sort_by_likes_ascending() {
    let app = test_app().await;

    for uri in [
        "/api/posts?authorIds=1,2&sortBy=likes",
        "/api/posts?authorIds=1,2&sortBy=likes&direction=asc",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);

        let likes = field_values(&body, "likes");
        assert!(likes.windows(2).all(|w| w[0] <= w[1]), "{uri}: {likes:?}");
        assert_eq!(sorted(post_ids(&body)), vec![1, 2, 3, 5]);
    }
}

#[tokio::test]
async fn test_sort_by_likes_descending() {
    let app = test_app().await;

    let (status, body) = app
        .get("/api/posts?authorIds=1,2&sortBy=likes&direction=desc")
        .await;
    assert_eq!(status, StatusCode::OK);

    let likes = field_values(&body, "likes");
    assert!(likes.windows(2).all(|w| w[0] >= w[1]), "{likes:?}");
    assert_eq!(likes.first(), Some(&735.0));
    assert_eq!(likes.last(), Some(&12.0));
}

#[tokio::test]
async fn test_sort_by_reads_and_popularity() {
    let app = test_app().await;

    let (_, body) = app
        .get("/api/posts?authorIds=1,2,3,4&sortBy=reads&direction=asc")
        .await;
    let reads = field_values(&body, "reads");
    assert!(reads.windows(2).all(|w| w[0] <= w[1]), "{reads:?}");
    assert_eq!(sorted(post_ids(&body)), vec![1, 2, 3, 4, 5, 6]);

    let (_, body) = app
        .get("/api/posts?authorIds=1,2,3,4&sortBy=popularity&direction=desc")
        .await;
    let popularity = field_values(&body, "popularity");
    assert!(popularity.windows(2).all(|w| w[0] >= w[1]), "{popularity:?}");
    assert_eq!(post_ids(&body).first(), Some(&4));
}

#[tokio::test]
async fn test_repeated_request_is_identical() {
    let app = test_app().await;
    let uri = "/api/posts?authorIds=1,2,3&sortBy=likes&direction=desc";

    let first = app.get_raw(uri).await;
    let second = app.get_raw(uri).await;

    assert_eq!(first, second);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints_need_no_token() {
    let app = test_app().await;

    let (status, body) = app
        .send(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app
        .send(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ready": true, "database": true }));
}
