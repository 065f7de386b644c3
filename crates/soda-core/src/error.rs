use std::path::PathBuf;

use thiserror::Error;

/// Validation errors for values built by callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query parameter '{field}' cannot be empty")]
    EmptyQueryValue { field: &'static str },

    #[error("endpoint must be an absolute http(s) URL: '{value}'")]
    InvalidEndpoint { value: String },

    #[error("timestamp must look like 'Wed, 21 Oct 2015 07:28:00 GMT': '{value}'")]
    InvalidHttpDate { value: String },
}

/// Errors raised while loading the dataset catalogue.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("dataset '{name}' is not configured")]
    UnknownDataset { name: String },

    #[error("dataset '{name}' has an invalid api_url: {reason}")]
    InvalidUrl { name: String, reason: ValidationError },
}
