//! Mint card endpoints
//!
//! Wallet-facing operations run on their own task so a dropped HTTP request
//! can't cancel an operation halfway and leave its in-flight flag set.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nft_mint::MintView;

use crate::dto::{ApiError, NetworkRequest, QuantityRequest};
use crate::state::{AppState, Controller};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Create mint routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/connect", post(connect))
        .route("/switch", post(switch_network))
        .route("/mint", post(mint))
        .route("/network", post(select_network))
        .route("/quantity", post(adjust_quantity))
}

/// GET /api/state - Current mint card view
pub async fn get_state(State(state): State<AppState>) -> Json<MintView> {
    Json(state.controller().view().await)
}

/// POST /api/connect - Request wallet accounts
pub async fn connect(State(state): State<AppState>) -> ApiResult<MintView> {
    run_detached(&state, |controller| async move { controller.connect().await }).await
}

/// POST /api/switch - Switch the wallet to the selected network
pub async fn switch_network(State(state): State<AppState>) -> ApiResult<MintView> {
    run_detached(&state, |controller| async move {
        controller.switch_network().await
    })
    .await
}

/// POST /api/mint - Submit the purchase transaction
pub async fn mint(State(state): State<AppState>) -> ApiResult<MintView> {
    run_detached(&state, |controller| async move { controller.mint().await }).await
}

/// POST /api/network - Change the selected network
pub async fn select_network(
    State(state): State<AppState>,
    Json(request): Json<NetworkRequest>,
) -> Json<MintView> {
    let controller = state.controller();
    controller.select_network(request.network).await;
    Json(controller.view().await)
}

/// POST /api/quantity - Step the quantity
pub async fn adjust_quantity(
    State(state): State<AppState>,
    Json(request): Json<QuantityRequest>,
) -> Json<MintView> {
    let controller = state.controller();
    controller.set_quantity(request.delta).await;
    Json(controller.view().await)
}

async fn run_detached<F, Fut>(state: &AppState, operation: F) -> ApiResult<MintView>
where
    F: FnOnce(Arc<Controller>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let controller = state.controller().clone();
    tokio::spawn(operation(controller.clone()))
        .await
        .map_err(|e| {
            tracing::error!("Mint operation task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("internal_error", e.to_string())),
            )
        })?;
    Ok(Json(controller.view().await))
}
