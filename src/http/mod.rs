//! HTTP API module.
//!
//! REST endpoints for signup, position lookup, social shares and the
//! admin dashboard, plus a health check.

mod types;
mod waitlist;


use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use types::AppState;

/// Build the application router.
pub fn create_router(state: AppState, cors_allow_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/waitlist",
            post(waitlist::create_entry).get(waitlist::list_entries),
        )
        .route("/api/waitlist/position", get(waitlist::get_position))
        .route("/api/waitlist/share", post(waitlist::record_share))
        .route("/api/waitlist/stats", get(waitlist::stats))
        .layer(create_cors_layer(cors_allow_origin))
        .with_state(state)
}

/// CORS layer: a comma-separated origin list restricts access, anything
/// else (unset or `*`) allows any origin.
fn create_cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let cors = match allow_origin {
        Some(origins) if !origins.is_empty() && origins != "*" => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new().allow_origin(AllowOrigin::list(origins))
        }
        _ => CorsLayer::new().allow_origin(AllowOrigin::any()),
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
