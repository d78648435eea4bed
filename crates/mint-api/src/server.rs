//! HTTP server setup and configuration

use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::create_router;
use crate::AppState;

/// Create the full application router with middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Address the server listens on
pub fn bind_address(bind_all: bool, port: u16) -> SocketAddr {
    let ip = if bind_all {
        Ipv4Addr::UNSPECIFIED
    } else {
        Ipv4Addr::LOCALHOST
    };
    SocketAddr::from((ip, port))
}

/// Start the HTTP server
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let config = state.config();
    let addr = bind_address(config.bind_all, config.api_port);
    if !config.media_dir.is_dir() {
        tracing::warn!(
            "Media directory {} not found, gallery files will 404",
            config.media_dir.display()
        );
    }
    let app = create_app(state);

    tracing::info!("Starting mint page on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
