use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("No layout mode: {0}")]
    UnknownLayoutMode(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),
    #[error("Unknown item: {0}")]
    UnknownItem(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
