//! Media gallery endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::gallery::GalleryView;
use crate::AppState;

/// Create gallery routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(current))
        .route("/next", post(next))
        .route("/prev", post(prev))
}

/// GET /api/gallery - Item currently shown
pub async fn current(State(state): State<AppState>) -> Json<GalleryView> {
    Json(state.gallery().read().await.view())
}

/// POST /api/gallery/next
pub async fn next(State(state): State<AppState>) -> Json<GalleryView> {
    let mut gallery = state.gallery().write().await;
    gallery.next();
    Json(gallery.view())
}

/// POST /api/gallery/prev
pub async fn prev(State(state): State<AppState>) -> Json<GalleryView> {
    let mut gallery = state.gallery().write().await;
    gallery.prev();
    Json(gallery.view())
}
