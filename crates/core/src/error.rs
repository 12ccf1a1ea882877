use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("bad response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Historical data not available.")]
    DataUnavailable,

    #[error("reduction failed: {0}")]
    Reduction(String),
}
