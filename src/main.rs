//! Round Timer - An interval-workout countdown service
//!
//! This is the main entry point for the round-timer application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use round_timer::{
    api::create_router,
    config::Config,
    engine::CountdownEngine,
    state::AppState,
    tasks::{attach_terminal_cues, spawn_countdown},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("round_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting round-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, break={}s, tick={}ms",
        config.host, config.port, config.break_secs, config.tick_ms
    );

    let registry = config.seed_registry()?;
    info!(
        "Workout seeded with {} rounds ({}s of exercise)",
        registry.len(),
        registry.total_seconds()
    );

    let mut engine = CountdownEngine::new().with_break_seconds(config.break_secs);
    if config.beep {
        attach_terminal_cues(&mut engine);
    }

    // Start the countdown background task
    let channels = spawn_countdown(engine, config.tick_period());

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        registry,
        channels,
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /rounds             - List rounds");
    info!("  POST   /rounds             - Add a round");
    info!("  DELETE /rounds/:index      - Remove a round");
    info!("  PUT    /rounds/:index/label - Change a round's exercise");
    info!("  PUT    /rounds/:index/time - Change a round's time");
    info!("  POST   /start              - Start the workout");
    info!("  POST   /stop               - Cancel the workout");
    info!("  GET    /status             - Current countdown status");
    info!("  GET    /events             - Server-sent countdown events");
    info!("  GET    /health             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
