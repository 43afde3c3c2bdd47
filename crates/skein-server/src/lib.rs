//! HTTP server for Skein.
//!
//! Serves users and their timelines over a small JSON API:
//!
//! | Method | Path                            | Action                              |
//! |--------|---------------------------------|-------------------------------------|
//! | GET    | `/v1/health`                    | liveness                            |
//! | GET    | `/v1/info`                      | version, capacity, user count       |
//! | POST   | `/v1/users`                     | register a user                     |
//! | GET    | `/v1/users/:username`           | profile and published root          |
//! | GET    | `/v1/feed/:user?from=&to=`      | posts in `created_at` order         |
//! | POST   | `/v1/feed/:user`                | insert a batch of posts and publish |
//! | GET    | `/v1/posts/:user/:timestamp`    | one post by `created_at`            |
//!
//! Failures come back as `{"error": "..."}` with a status that reflects the
//! cause: 404 for unknown users or posts, 409 for a taken username, 400 for
//! bad input, 500 otherwise. Bodies or queries that fail to parse keep the
//! status axum assigns them (400, 415 or 422) but still get the JSON shape.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, FeedQuery, PublishResponse};
pub use server::SkeinServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use skein_sdk::{ListConfig, Skein};
    use tower::util::ServiceExt;

    fn app() -> Router {
        let skein = Skein::in_memory_with(ListConfig::with_capacity(3).unwrap()).unwrap();
        router::build_router(AppState::new(skein), false)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|body| ("application/json", body.to_string()));
        send_raw(app, method, uri, body).await
    }

    async fn send_raw(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<(&str, String)>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some((content_type, body)) => request
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn with_user(app: &Router, username: &str) {
        let (status, _) = send(
            app,
            "POST",
            "/v1/users",
            Some(json!({ "username": username, "pubkey": "beef", "created_at": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(&app(), "GET", "/v1/health", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let app = app();
        with_user(&app, "alice").await;
        let (status, body) = send(&app, "GET", "/v1/info", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["capacity"], 3);
        assert_eq!(body["users"], 1);
    }

    #[tokio::test]
    async fn user_lifecycle() {
        let app = app();
        with_user(&app, "alice").await;

        let (status, body) = send(&app, "GET", "/v1/users/alice", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["pubkey"], "beef");
        assert!(body["posts_root"].is_null());

        let taken = json!({ "username": "alice" });
        let (status, body) = send(&app, "POST", "/v1/users", Some(taken)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("alice"));

        let (status, _) = send(&app, "GET", "/v1/users/bob", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let bad = json!({ "username": ".bad" });
        let (status, _) = send(&app, "POST", "/v1/users", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn posting_and_reading_a_feed() {
        let app = app();
        with_user(&app, "alice").await;

        let batch: Vec<Value> = [40, 10, 30, 20, 50]
            .iter()
            .map(|t| {
                json!({
                    "type": "note",
                    "created_at": t,
                    "data": { "text": format!("at {t}") },
                })
            })
            .collect();
        let (status, body) = send(&app, "POST", "/v1/feed/alice", Some(Value::Array(batch))).await;
        assert_eq!(status, 200);
        assert_eq!(body["posts"], 5);
        let root = body["root"].as_str().unwrap().to_string();

        let (_, profile) = send(&app, "GET", "/v1/users/alice", None).await;
        assert_eq!(profile["posts_root"], root.as_str());

        let (status, feed) = send(&app, "GET", "/v1/feed/alice", None).await;
        assert_eq!(status, 200);
        let times: Vec<u64> = feed
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["created_at"].as_u64().unwrap())
            .collect();
        assert_eq!(times, vec![10, 20, 30, 40, 50]);

        let (_, window) = send(&app, "GET", "/v1/feed/alice?from=20&to=40", None).await;
        assert_eq!(window.as_array().unwrap().len(), 3);

        let (status, post) = send(&app, "GET", "/v1/posts/alice/30", None).await;
        assert_eq!(status, 200);
        assert_eq!(post["data"]["text"], "at 30");
        assert_eq!(post["type"], "note");
    }

    #[tokio::test]
    async fn missing_things_are_404() {
        let app = app();
        with_user(&app, "alice").await;

        let (status, _) = send(&app, "GET", "/v1/posts/alice/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", "/v1/feed/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            "POST",
            "/v1/feed/nobody",
            Some(json!([{ "created_at": 1, "data": null }])),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_input_is_400() {
        let app = app();
        with_user(&app, "alice").await;

        let (status, body) = send(&app, "POST", "/v1/feed/alice", Some(json!([]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        let (status, body) = send(&app, "GET", "/v1/feed/alice?from=9&to=1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        let (status, body) = send(&app, "GET", "/v1/posts/alice/yesterday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("yesterday"));
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let app = app();
        with_user(&app, "alice").await;

        let (status, body) = send(&app, "GET", "/v1/feed/alice?from=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let truncated = Some(("application/json", "[{\"created_at\": 1".to_string()));
        let (status, body) = send_raw(&app, "POST", "/v1/feed/alice", truncated).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let wrong_shape = Some(("application/json", r#"{"created_at": 1}"#.to_string()));
        let (status, body) = send_raw(&app, "POST", "/v1/feed/alice", wrong_shape).await;
        assert!(status.is_client_error());
        assert!(body["error"].is_string());

        let not_json = Some(("text/plain", r#"{"username": "bob"}"#.to_string()));
        let (status, body) = send_raw(&app, "POST", "/v1/users", not_json).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, "GET", "/v1/users/alice", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
