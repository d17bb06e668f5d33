use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::classifier::{to_lake_record, SafetyPolicy};
use crate::config::Config;
use crate::extractor::extract_tables;
use crate::fetch_error::FetchError;
use crate::fetcher::SnippetFetcher;
use crate::model::{DiagnosticKind, LakeDataset, LakeDescriptor, LakeDiagnostic};
use crate::reconciler::{reconcile, retain_latest, Reconciliation};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Network unavailable: all {attempted} lake fetches failed without a response")]
    NetworkUnavailable { attempted: usize },
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] FetchError),
}

/// Result of fetch + extract + reconcile for one lake
#[derive(Debug)]
pub struct LakeOutcome {
    pub lake: LakeDescriptor,
    pub url: String,
    pub result: Result<Reconciliation, FetchError>,
}

/// Builds the per-lake dataset for one run.
///
/// Each lake is processed independently; a failing lake becomes a diagnostic
/// and the run carries on with the next one.
#[derive(Clone)]
pub struct LakeDatasetBuilder {
    fetcher: SnippetFetcher,
    policy: SafetyPolicy,
    concurrency: usize,
    excluded: Vec<String>,
}

impl LakeDatasetBuilder {
    pub fn new(fetcher: SnippetFetcher, policy: SafetyPolicy) -> Self {
        Self {
            fetcher,
            policy,
            concurrency: 1,
            excluded: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, DatasetError> {
        let fetcher = SnippetFetcher::new(
            config.snippet_url_template.clone(),
            config.fetch_timeout(),
            config.fetch_retries,
        )?;
        Ok(Self::new(fetcher, config.safety_policy())
            .with_concurrency(config.fetch_concurrency)
            .with_excluded(config.excluded_lakes.clone()))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Lakes whose id or name is listed here are skipped
    pub fn with_excluded(mut self, excluded: Vec<String>) -> Self {
        self.excluded = excluded;
        self
    }

    fn is_excluded(&self, lake: &LakeDescriptor) -> bool {
        self.excluded
            .iter()
            .any(|e| e == &lake.id || e == &lake.name)
    }

    pub async fn build(&self, lakes: &[LakeDescriptor]) -> Result<LakeDataset, DatasetError> {
        self.build_at(lakes, Utc::now()).await
    }

    #[instrument(skip(self, lakes), fields(lakes = lakes.len(), concurrency = self.concurrency))]
    pub async fn build_at(
        &self,
        lakes: &[LakeDescriptor],
        now: DateTime<Utc>,
    ) -> Result<LakeDataset, DatasetError> {
        let selected: Vec<LakeDescriptor> = lakes
            .iter()
            .filter(|lake| {
                let excluded = self.is_excluded(lake);
                if excluded {
                    info!("Skipping excluded lake {}", lake.name);
                }
                !excluded
            })
            .cloned()
            .collect();

        info!("Processing {} lakes", selected.len());

        // `buffered` keeps catalog order while fetching concurrently
        let outcomes: Vec<LakeOutcome> = stream::iter(selected)
            .map(|lake| self.process_lake(lake))
            .buffered(self.concurrency)
            .collect()
            .await;

        assemble(outcomes, now, &self.policy)
    }

    // Owned descriptor keeps the refresh future `Send` for `tokio::spawn`
    #[instrument(skip(self, lake), fields(lake = %lake.name))]
    async fn process_lake(&self, lake: LakeDescriptor) -> LakeOutcome {
        let url = self.fetcher.url_for(&lake);
        let result = match self.fetcher.fetch_snippet(&lake).await {
            Ok(html) => extract_tables(&html, &lake, &url)
                .and_then(|tables| reconcile(&lake, tables.observations, tables.lab)),
            Err(e) => Err(e),
        };

        LakeOutcome { lake, url, result }
    }
}

fn diagnostic_kind(error: &FetchError) -> DiagnosticKind {
    match error {
        FetchError::DataUnavailable { .. } => DiagnosticKind::DataUnavailable,
        FetchError::MalformedRow { .. } => DiagnosticKind::MalformedRow,
        FetchError::UnparseableDate(_) => DiagnosticKind::UnparseableDate,
        FetchError::Request(_) | FetchError::HttpStatus { .. } => DiagnosticKind::FetchFailed,
    }
}

fn diagnostic(lake: &LakeDescriptor, url: &str, kind: DiagnosticKind, message: String) -> LakeDiagnostic {
    LakeDiagnostic {
        lake_id: lake.id.clone(),
        lake_name: lake.name.clone(),
        url: url.to_string(),
        kind,
        message,
    }
}

/// Turn per-lake outcomes into the final dataset.
///
/// Keeps the latest sample per lake name, then normalizes and classifies every
/// surviving record against the same `now`.
pub fn assemble(
    outcomes: Vec<LakeOutcome>,
    now: DateTime<Utc>,
    policy: &SafetyPolicy,
) -> Result<LakeDataset, DatasetError> {
    let attempted = outcomes.len();
    let transport_failures = outcomes
        .iter()
        .filter(|o| matches!(&o.result, Err(e) if e.is_transport()))
        .count();
    if attempted > 0 && transport_failures == attempted {
        return Err(DatasetError::NetworkUnavailable { attempted });
    }

    let mut samples = Vec::new();
    let mut diagnostics = Vec::new();

    for LakeOutcome { lake, url, result } in outcomes {
        match result {
            Err(e) => {
                warn!("Skipping lake {}: {} (source: {})", lake.name, e, url);
                diagnostics.push(diagnostic(&lake, &url, diagnostic_kind(&e), e.to_string()));
            }
            Ok(reconciliation) => {
                if !reconciliation.unmatched_lab_dates.is_empty() {
                    let dates: Vec<String> = reconciliation
                        .unmatched_lab_dates
                        .iter()
                        .map(|d| d.format("%d.%m.%Y").to_string())
                        .collect();
                    diagnostics.push(diagnostic(
                        &lake,
                        &url,
                        DiagnosticKind::UnmatchedLabRows,
                        format!(
                            "{} laboratory rows without observation date dropped: {}",
                            dates.len(),
                            dates.join(", ")
                        ),
                    ));
                }

                match reconciliation.latest_record() {
                    Some(record) => {
                        debug!("Latest sample for {} is from {}", lake.name, record.sample_date);
                        samples.push(record);
                    }
                    None => {
                        warn!(
                            "> information not available for lake {}! no observation rows: {}",
                            lake.name, url
                        );
                        diagnostics.push(diagnostic(
                            &lake,
                            &url,
                            DiagnosticKind::DataUnavailable,
                            "observation table has no rows".to_string(),
                        ));
                    }
                }
            }
        }
    }

    let records: Vec<_> = retain_latest(samples)
        .into_iter()
        .map(|sample| to_lake_record(sample, now, policy))
        .collect();

    info!(
        "Built dataset with {} lakes ({} diagnostics)",
        records.len(),
        diagnostics.len()
    );

    Ok(LakeDataset {
        generated_at: now,
        records,
        diagnostics,
    })
}
