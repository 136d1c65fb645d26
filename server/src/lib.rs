//! Authoritative pong server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod config;
pub mod error;
pub mod game_loop;
pub mod session;
pub mod state;
pub mod ws;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;

use config::ServerConfig;
use error::ServerError;
use game_loop::{run_game_loop, GameBroadcast, GameCommand};
use ws::{ws_handler, AppState};

/// Validate the configuration, bind the listen address, spawn the game loop
/// and return the router ready to serve.
pub async fn bind(config: ServerConfig) -> Result<(TcpListener, Router), ServerError> {
    config.validate().map_err(ServerError::InvalidConfig)?;

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| ServerError::BindFailure {
            addr: config.listen_addr.clone(),
            source,
        })?;

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(64);

    // Spawn game loop
    tokio::spawn(async move {
        run_game_loop(game_rx, broadcast_tx, config).await;
    });

    let app_state = AppState { game_tx };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    Ok((listener, app))
}
