use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{initialize_app_state, Settings};
use crate::router::create_router;
use crate::scheduler::spawn_scheduler;

pub async fn serve(settings: &Settings) -> Result<()> {
    trace!("Entering serve function");
    info!("duetrack starting up");
    debug!("Bind address: {}", settings.bind_address);

    let state = match initialize_app_state(settings).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    let scheduler = if settings.scheduler_enabled {
        Some(spawn_scheduler(state.runner.clone(), settings.scheduler_interval()))
    } else {
        info!("Recurrence scheduler disabled");
        None
    };

    let app = create_router(state);

    info!("Starting server on {}", settings.bind_address);
    let listener = match TcpListener::bind(&settings.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", settings.bind_address, e);
            return Err(e.into());
        }
    };

    info!("duetrack API server running on http://{}", settings.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", settings.bind_address);

    let served = axum::serve(listener, app).await;
    if let Some(scheduler) = scheduler {
        scheduler.abort();
    }
    if let Err(e) = served {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
