use thiserror::Error;

use crate::domain::ProductId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Snapshot source errors.
///
/// Transport failures (`Http`, `Timeout`, `Status`) mark the check failed
/// and leave prior product state untouched; `Parse` degrades to an empty
/// snapshot instead of failing the check.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed product payload: {0}")]
    Parse(String),
}

impl SourceError {
    /// Whether this error is a payload decode failure rather than a
    /// transport failure.
    pub fn is_parse(&self) -> bool {
        matches!(self, SourceError::Parse(_))
    }
}

/// Persistence errors. Logged and contained; never block monitoring.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("product {id} is already registered")]
    DuplicateProduct { id: ProductId },

    #[error("cannot derive a product id from '{url}'")]
    InvalidIdentifier { url: String },

    #[error("no product with id {id}")]
    NotFound { id: ProductId },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Source(SourceError::Http(err))
    }
}
