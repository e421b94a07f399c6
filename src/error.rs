use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Per-track analysis failures are deliberately absent: they are collected as
/// [`crate::types::FailureRecord`]s and only surface as a residual count.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("upstream request to {url} failed with status {}", display_status(.status))]
    Upstream { status: Option<u16>, url: String },

    #[error("cannot decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PipelineError {
    /// Builds an `Upstream` error from a transport error that carries no
    /// response, keeping whatever status reqwest could extract.
    pub fn upstream(url: &str, err: &reqwest::Error) -> Self {
        PipelineError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            url: url.to_string(),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none (no response)".to_string(),
    }
}
