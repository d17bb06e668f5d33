#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("Information not available for lake {lake} ({reason}): {url}")]
    DataUnavailable {
        lake: String,
        url: String,
        reason: String,
    },
    #[error("Malformed row {row} in {table} table of lake {lake}: expected {expected} columns, found {found}")]
    MalformedRow {
        lake: String,
        table: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Failed to parse sample date: {0:?}")]
    UnparseableDate(String),
}

impl FetchError {
    /// Connect errors, timeouts and 5xx responses are worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => e.is_timeout() || e.is_connect(),
            FetchError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// True when no HTTP response was received at all
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Request(e) if !e.is_status())
    }
}
