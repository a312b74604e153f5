//! BlogForge API Gateway
//!
//! Serves the blog read API to the site frontend:
//! - Post listing and post detail JSON
//! - Raw image bytes
//! - Health and readiness probes
//! - Request logging, request ids and metrics

pub mod handlers;
pub mod middleware;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use blogforge_common::{config::AppConfig, db::DbPool};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin(&state.config.server.cors_allowed_origin))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());

    let blog_routes = Router::new()
        .route("/api/blog_posts", get(handlers::blog::list_posts))
        .route("/api/blog/{post_id}", get(handlers::blog::get_post))
        .route("/api/blog/image/{image_id}", get(handlers::blog::get_image))
        .route("/home/{name}", get(handlers::demo::home))
        .route("/test", get(handlers::demo::echo_query))
        .route_layer(axum::middleware::from_fn(middleware::metrics::track_http_metrics));

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .merge(blog_routes)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// `*` allows any origin; anything else must be a single valid origin
fn allowed_origin(origin: &str) -> AllowOrigin {
    if origin.trim() == "*" {
        return AllowOrigin::any();
    }

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            warn!(origin, error = %e, "Invalid CORS origin, allowing any");
            AllowOrigin::any()
        }
    }
}
