use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukewire_relay::Config;

/// Build the CORS layer based on configuration.
///
/// Production gets strict CORS (no cross-origin requests); development
/// gets permissive CORS for local frontend convenience.
fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.is_production() {
        CorsLayer::new()
    } else {
        tracing::warn!("Using permissive CORS in development mode");
        CorsLayer::permissive()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukewire_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.environment,
        mopidy_url = %config.mopidy_url,
        directory_url = %config.directory_url,
        "Starting Jukewire relay on port {}",
        config.port
    );

    let cors_layer = build_cors_layer(&config);
    let app = jukewire_relay::build_app(&config.mopidy_url, &config.directory_url)?
        .layer(cors_layer);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("WebSocket endpoint at ws://{}/ws", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
