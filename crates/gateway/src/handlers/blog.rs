//! Blog read handlers

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use blogforge_common::{
    db::{views::FALLBACK_CONTENT_TYPE, PostDetail, PostSummary, Repository},
    errors::{AppError, Result},
    metrics,
};

use crate::AppState;

/// List every post, oldest first
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostSummary>>> {
    let repo = Repository::new(state.db.clone());

    let posts = repo.list_posts().await?;

    Ok(Json(posts))
}

/// Get a post with its content blocks in order.
///
/// An id that is not an integer names no post, so it is a 404 as well.
pub async fn get_post(
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<PostDetail>> {
    let Path(post_id) = path.map_err(|rejection| AppError::InvalidPostId {
        raw: rejection.body_text(),
    })?;

    let repo = Repository::new(state.db.clone());

    let detail = repo.get_post_detail(post_id).await?;

    tracing::debug!(
        post_id,
        blocks = detail.content_blocks.len(),
        "Post detail served"
    );

    Ok(Json(detail))
}

/// Serve an image's raw bytes.
///
/// Errors are plain text here since browsers load these URLs directly.
pub async fn get_image(
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Response {
    let Ok(Path(image_id)) = path else {
        return (StatusCode::NOT_FOUND, "Image not found").into_response();
    };

    let repo = Repository::new(state.db.clone());

    match repo.find_image(image_id).await {
        Ok(image) => {
            metrics::record_image_served(image.image_data.len());

            let content_type = image
                .content_type
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

            ([(header::CONTENT_TYPE, content_type)], image.image_data).into_response()
        }
        Err(AppError::ImageNotFound { .. }) => {
            tracing::debug!(image_id, "Image not found");
            (StatusCode::NOT_FOUND, "Image not found").into_response()
        }
        Err(e) => {
            e.log();
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
