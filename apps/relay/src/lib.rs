//! Jukewire relay server library
//!
//! A shared-session jukebox relay: one WebSocket endpoint where every
//! listener follows the same now-playing state, anyone can search the
//! library, authenticated listeners queue tracks, and admins control
//! the transport. Playback itself lives in an external Mopidy-style
//! backend; authority lives in an external identity directory.

use axum::{extract::Extension, routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod websocket;

pub use config::Config;
pub use error::{RelayError, RelayResult};

use jukewire_mopidy_client::MopidyClient;
use routes::{health_router, HealthState};
use services::{AuthorityResolver, DirectoryClient};
use websocket::{
    ws_handler, CommandDispatcher, ConnectionRegistry, SearchRelay, StateBroadcaster,
};

/// Build the relay application router
///
/// Wires every collaborator around one shared [`ConnectionRegistry`]
/// and exposes the WebSocket endpoint plus the health routes. The
/// router is self-contained, which is what the integration tests lean
/// on.
pub fn build_app(mopidy_url: &str, directory_url: &str) -> RelayResult<Router> {
    let backend = MopidyClient::new(mopidy_url)?;
    let directory = DirectoryClient::new(directory_url)?;

    let registry = ConnectionRegistry::new();
    let resolver = AuthorityResolver::new(directory);
    let state = StateBroadcaster::new(backend.clone(), registry.clone());
    let search = SearchRelay::new(backend.clone(), registry.clone());
    let dispatcher = CommandDispatcher::new(backend.clone(), registry.clone(), resolver, state, search);

    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .nest("/health", health_router(HealthState::new(backend)))
        .layer(Extension(registry))
        .layer(Extension(dispatcher))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn root() -> &'static str {
    "Jukewire - Shared Session Jukebox Relay"
}
