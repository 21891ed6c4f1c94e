use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid filter {field}: {value}")]
    InvalidFilter { field: String, value: String },

    #[error("Invalid quarter: {0}")]
    QuarterParse(String),

    #[error("Invalid stage override: {0}")]
    InvalidOverride(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_filter(field: &str, value: &str) -> Self {
        Error::InvalidFilter {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
