use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, instrument, warn};

use crate::fetch_error::FetchError;
use crate::model::LakeDescriptor;
use crate::utils::snippet_url;

/// Downloads the per-lake HTML snippet from the state health portal.
///
/// The public detail page loads its tables dynamically; the snippet URL
/// returns the same tables as a static fragment.
#[derive(Clone)]
pub struct SnippetFetcher {
    client: reqwest::Client,
    url_template: String,
    retries: usize,
}

impl SnippetFetcher {
    pub fn new(url_template: String, timeout: Duration, retries: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url_template,
            retries,
        })
    }

    pub fn url_for(&self, lake: &LakeDescriptor) -> String {
        snippet_url(&self.url_template, &lake.id)
    }

    /// Fetch the snippet, retrying transient failures with exponential backoff.
    ///
    /// Timeouts and 404s are reported as [`FetchError::DataUnavailable`].
    #[instrument(skip(self, lake), fields(lake = %lake.name, lake_id = %lake.id))]
    pub async fn fetch_snippet(&self, lake: &LakeDescriptor) -> Result<String, FetchError> {
        let url = self.url_for(lake);

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(10))
            .with_max_times(self.retries);

        let result = (|| self.fetch_once(&url))
            .retry(backoff)
            .when(FetchError::is_transient)
            .notify(|e: &FetchError, delay: Duration| {
                warn!("Fetch of {} failed ({}), retrying in {:?}", url, e, delay);
            })
            .await;

        match result {
            Err(FetchError::Request(e)) if e.is_timeout() => Err(FetchError::DataUnavailable {
                lake: lake.name.clone(),
                url,
                reason: "request timed out".to_string(),
            }),
            Err(FetchError::HttpStatus { status: 404, url }) => Err(FetchError::DataUnavailable {
                lake: lake.name.clone(),
                url,
                reason: "snippet not found (404)".to_string(),
            }),
            other => other,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        debug!("Sending HTTP request for lake snippet");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        debug!("Retrieved HTML content, size: {} bytes", html.len());
        Ok(html)
    }
}
