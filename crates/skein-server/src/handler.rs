use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use skein_sdk::{Address, Post, Skein, SdkResult, UserProfile};

use crate::error::{ServerError, ServerResult};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub skein: Arc<Skein>,
}

impl AppState {
    pub fn new(skein: Skein) -> Self {
        Self {
            skein: Arc::new(skein),
        }
    }
}

/// Bounds for `GET /v1/feed/:user`; both inclusive, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// Body of a successful `POST /v1/feed/:user`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublishResponse {
    pub username: String,
    pub root: Address,
    pub posts: usize,
}

/// Run store-bound work off the async executor.
async fn blocking<T, F>(state: &AppState, work: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Skein) -> SdkResult<T> + Send + 'static,
{
    let skein = Arc::clone(&state.skein);
    tokio::task::spawn_blocking(move || work(&skein))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    let users = blocking(&state, |skein| skein.users()).await?;
    Ok(Json(json!({
        "name": "skein-server",
        "version": env!("CARGO_PKG_VERSION"),
        "capacity": state.skein.config().capacity,
        "users": users.len(),
    })))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    body: Result<Json<UserProfile>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<UserProfile>)> {
    let Json(profile) = body?;
    let created = blocking(&state, move |skein| skein.create_user(profile)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ServerResult<Json<UserProfile>> {
    let profile = blocking(&state, move |skein| skein.user(&username)).await?;
    Ok(Json(profile))
}

pub async fn get_feed_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<Post>>> {
    let Query(query) = query?;
    let posts = blocking(&state, move |skein| {
        skein.feed_range(&username, query.from, query.to)
    })
    .await?;
    Ok(Json(posts))
}

pub async fn post_feed_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<Vec<Post>>, JsonRejection>,
) -> ServerResult<Json<PublishResponse>> {
    let Json(posts) = body?;
    if posts.is_empty() {
        return Err(ServerError::BadRequest("no posts in request body".into()));
    }
    let count = posts.len();
    let response = blocking(&state, move |skein| {
        let root = skein.post_feed_items(&username, &posts)?;
        Ok(PublishResponse {
            username,
            root,
            posts: count,
        })
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_post_handler(
    State(state): State<AppState>,
    Path((username, timestamp)): Path<(String, String)>,
) -> ServerResult<Json<Post>> {
    let timestamp: u64 = timestamp
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid timestamp `{timestamp}`")))?;
    let post = blocking(&state, move |skein| skein.post(&username, timestamp)).await?;
    Ok(Json(post))
}
