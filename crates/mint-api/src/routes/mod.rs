//! API route handlers

pub mod bridge;
pub mod gallery;
pub mod health;
pub mod mint;

use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::services::ServeDir;

use crate::page::generate_mint_page;
use crate::AppState;

pub const PAGE_TITLE: &str = "Ancient Coins NFT Mint";

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config().media_dir);
    let api = Router::new()
        .merge(mint::router())
        .nest("/gallery", gallery::router());

    Router::new()
        .route("/", get(index))
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .nest("/bridge", bridge::router())
        .nest_service("/media", media)
        .with_state(state)
}

/// GET / - The mint page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let poll_ms = u64::try_from(state.poll_timeout().as_millis()).unwrap_or(u64::MAX);
    Html(generate_mint_page(PAGE_TITLE, poll_ms))
}
