use incident_monitor::config::Config;
use incident_monitor::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "incident_monitor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");

    let state = Arc::new(AppState::from_config(&config).expect("Failed to build HTTP client"));
    tracing::info!(log_file = %config.log_file.display(), "Incident log sink ready");

    let app = incident_monitor::create_app(state.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await.unwrap();
    tracing::info!("Server running on http://{}", config.bind_addr);

    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            shutdown.cancel();
        })
        .await
        .unwrap();

    state.engine.shutdown().await;
    tracing::info!("Monitor shut down");
}
