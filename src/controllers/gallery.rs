use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::services::gallery::GallerySource;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/gallery/{source}", get(get_gallery))
}

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub filter: Option<String>,
}

// GET /api/gallery/{source}?filter=
pub async fn get_gallery(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    Query(params): Query<GalleryQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let source: GallerySource = source.parse().map_err(|e| (StatusCode::NOT_FOUND, e))?;
    let view = state.gallery.view(source, params.filter.as_deref()).await;
    Ok(Json(view))
}
