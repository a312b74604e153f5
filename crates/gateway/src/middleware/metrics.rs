//! Request metrics keyed by matched route

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use blogforge_common::metrics::RequestMetrics;

/// Count and time every routed request.
///
/// Uses the route template (`/api/blog/{post_id}`) rather than the raw path
/// so ids do not explode label cardinality.
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let metrics = RequestMetrics::start(req.method().as_str(), &endpoint);
    let response = next.run(req).await;
    metrics.finish(response.status().as_u16());

    response
}
