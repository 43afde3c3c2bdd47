use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all Skein endpoints.
pub fn build_router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/users", post(handler::create_user_handler))
        .route("/v1/users/:username", get(handler::get_user_handler))
        .route(
            "/v1/feed/:user",
            get(handler::get_feed_handler).post(handler::post_feed_handler),
        )
        .route("/v1/posts/:user/:timestamp", get(handler::get_post_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
