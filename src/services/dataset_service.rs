use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::model::{LakeDataset, LakeDescriptor, LakeDiagnostic, LakeRecord};
use crate::services::dataset_builder::{DatasetError, LakeDatasetBuilder};

/// Holds the most recent dataset for the API.
///
/// Only the refresh scheduler writes; a failed refresh keeps the previous
/// snapshot.
#[derive(Clone)]
pub struct DatasetService {
    builder: LakeDatasetBuilder,
    lakes: Arc<Vec<LakeDescriptor>>,
    latest: Arc<RwLock<Option<LakeDataset>>>,
}

impl DatasetService {
    pub fn new(builder: LakeDatasetBuilder, lakes: Vec<LakeDescriptor>) -> Self {
        Self {
            builder,
            lakes: Arc::new(lakes),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Run the builder over the catalog and publish the result
    #[instrument(skip(self), fields(lakes = self.lakes.len()))]
    pub async fn refresh(&self) -> Result<usize, DatasetError> {
        let dataset = self.builder.build(&self.lakes).await?;
        let count = dataset.records.len();
        self.publish(dataset).await;
        Ok(count)
    }

    /// Replace the current snapshot
    pub async fn publish(&self, dataset: LakeDataset) {
        info!(
            "Publishing dataset generated at {} with {} lakes",
            dataset.generated_at,
            dataset.records.len()
        );
        *self.latest.write().await = Some(dataset);
    }

    pub async fn latest(&self) -> Option<LakeDataset> {
        self.latest.read().await.clone()
    }

    /// `Ok(None)` when the lake is not in the current dataset, `Err(NotReady)` when
    /// no dataset has been built yet.
    pub async fn record(&self, lake_id: &str) -> Result<Option<LakeRecord>, NotReady> {
        let guard = self.latest.read().await;
        let dataset = guard.as_ref().ok_or(NotReady)?;
        Ok(dataset.find(lake_id).cloned())
    }

    pub async fn diagnostics(&self) -> Option<Vec<LakeDiagnostic>> {
        self.latest.read().await.as_ref().map(|d| d.diagnostics.clone())
    }
}

/// No dataset has been published yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dataset not built yet")]
pub struct NotReady;
