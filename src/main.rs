//! WOD Timer - workout generation API with server-side workout timers
//!
//! This is the main entry point for the wod-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use wod_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::generator_from_config,
    tasks::timer_events_task,
    timer::TokioClock,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("wod_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting wod-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, model={}",
          config.host, config.port, config.llm_model);

    // Create application state
    let generator = generator_from_config(&config);
    let clock = Arc::new(TokioClock::new());
    let state = Arc::new(AppState::new(config.port, config.host.clone(), generator, clock));

    // Start the timer event background task
    let event_state = Arc::clone(&state);
    tokio::spawn(async move {
        timer_events_task(event_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /health                    - Health check");
    info!("  POST   /api/generateWod           - Generate a workout");
    info!("  POST   /api/timers                - Create a timer");
    info!("  GET    /api/timers/:id            - Timer snapshot");
    info!("  POST   /api/timers/:id/{{action}}   - start, pause, toggle or reset");
    info!("  GET    /api/workouts              - Saved workout history");
    info!("  POST   /api/feedback              - Send feedback");

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

    state.dispose_all_timers();
    info!("Server shutdown complete");
    Ok(())
}
