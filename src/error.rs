use thiserror::Error;

// Error types for feed processing and board assembly
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Invalid sort mode: {0}")]
    InvalidSortMode(String),

    #[error("Unknown park: {0}")]
    UnknownPark(String),

    #[error("Snapshot contains no parks")]
    NoParks,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for ProcessingError {
    fn from(err: serde_json::Error) -> Self {
        ProcessingError::JsonParseError(err.to_string())
    }
}

impl From<toml::de::Error> for ProcessingError {
    fn from(err: toml::de::Error) -> Self {
        ProcessingError::ConfigError(err.to_string())
    }
}
