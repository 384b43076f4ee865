use thiserror::Error;

/// The underlying cause of a failed HTTP attempt
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: FetchFailure,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Subprocess `{command}` failed with {status}: {stderr}")]
    Subprocess {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResolveError {
    pub(crate) fn parse(context: impl std::fmt::Display, detail: impl std::fmt::Display) -> Self {
        ResolveError::Parse(format!("{context}: {detail}"))
    }
}
