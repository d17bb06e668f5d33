use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, instrument, warn};

use crate::services::DatasetService;

fn refresh_period(interval_minutes: u64) -> Duration {
    Duration::from_secs(interval_minutes.max(1).saturating_mul(60))
}

/// Rebuild the lake dataset every `interval_minutes`, starting immediately.
#[instrument(skip(dataset_service), fields(interval_minutes = %interval_minutes))]
pub async fn start_refresh_scheduler(dataset_service: DatasetService, interval_minutes: u64) {
    let mut interval = time::interval(refresh_period(interval_minutes));

    info!("Refresh scheduler started with {} minute interval", interval_minutes);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - rebuilding lake dataset");

        match dataset_service.refresh().await {
            Ok(0) => {
                warn!("Refresh finished but no lake had usable data");
            }
            Ok(count) => {
                info!("Successfully refreshed {} lakes", count);
            }
            Err(e) => {
                error!("Failed to refresh lake dataset, keeping previous snapshot: {}", e);
            }
        }
    }
}
