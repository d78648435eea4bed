//! Wallet bridge endpoints used by the page script

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use wallet_client::{BrowsingContext, WalletEvent};

use crate::bridge::BridgeRequest;
use crate::dto::{ApiError, BridgeReply, HelloResponse};
use crate::AppState;

/// Create bridge routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hello", post(hello))
        .route("/poll", get(poll))
        .route("/reply/:id", post(reply))
        .route("/event", post(event))
}

/// POST /bridge/hello - A page view started
///
/// Starts a new controller session, fails requests owed by the previous page
/// and reads the wallet's chain in the background.
pub async fn hello(
    State(state): State<AppState>,
    Json(environment): Json<BrowsingContext>,
) -> Json<HelloResponse> {
    let controller = state.controller().clone();
    controller.reset().await;
    let dropped_requests = state.bridge().attach(environment);
    state.gallery().write().await.reset();

    let session = controller.snapshot().await.session();
    tokio::spawn(async move { controller.sync_chain().await });

    Json(HelloResponse {
        session,
        dropped_requests,
    })
}

/// GET /bridge/poll - Wallet requests waiting for the page
pub async fn poll(State(state): State<AppState>) -> Json<Vec<BridgeRequest>> {
    Json(state.bridge().next_requests(state.poll_timeout()).await)
}

/// POST /bridge/reply/{id} - Result of one wallet request
pub async fn reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(reply): Json<BridgeReply>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    if state.bridge().resolve(&id, reply.into_outcome()) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("No pending wallet request {}", id))),
        ))
    }
}

/// POST /bridge/event - Provider notification
pub async fn event(State(state): State<AppState>, Json(event): Json<WalletEvent>) -> StatusCode {
    state.bridge().publish(event);
    StatusCode::NO_CONTENT
}
