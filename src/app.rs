use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::catalog;
use crate::config::Config;
use crate::scheduler;
use crate::services::{DatasetService, LakeDatasetBuilder};

/// Application with the spawned refresh scheduler and HTTP server
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub refresh_scheduler_handle: JoinHandle<()>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// Loads the lake catalog, then spawns:
    /// - HTTP API server (Axum)
    /// - Refresh scheduler (first run immediately, then every interval)
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let lakes = catalog::load_or_default(config.catalog_path.as_deref())?;
        info!("Monitoring {} lakes", lakes.len());

        let builder = LakeDatasetBuilder::from_config(&config)?;
        let dataset_service = DatasetService::new(builder, lakes);

        let refresh_scheduler_handle = {
            let dataset_service_clone = dataset_service.clone();
            let interval = config.refresh_interval_minutes;

            tokio::spawn(async move {
                scheduler::start_refresh_scheduler(dataset_service_clone, interval).await;
            })
        };

        let app_state = AppState { dataset_service };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            refresh_scheduler_handle,
        })
    }

    /// Run until the server stops; the scheduler runs in the background.
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        self.refresh_scheduler_handle.abort();
        Ok(())
    }
}
