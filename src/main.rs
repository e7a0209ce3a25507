use anyhow::Context;
use std::net::SocketAddr;
use tokio::task;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seat_booking::{config::Config, services::cleanup::CleanupService, AppState};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Seat Booking API ({})", config.app.environment);

    // Create the shared application state
    let app_state = AppState::new(config.clone()).context("failed to build HTTP client")?;

    // --- Start background tasks ---

    // Прогрев кеша витрины в фоне
    #[cfg(feature = "gallery")]
    {
        let gallery = app_state.gallery.clone();
        task::spawn(async move {
            gallery.warmup().await;
            info!("Gallery cache warmed up");
        });
    }

    // Очистка простаивающих сессий
    let cleanup = CleanupService::new(app_state.clone());
    task::spawn(cleanup.run_forever());

    // --- Start the web server ---

    let app = seat_booking::app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.app.host, config.app.port))?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
