use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No hierarchy data received")]
    MissingHierarchy,
    #[error("Malformed hierarchy: {0}")]
    MalformedHierarchy(String),
    #[error("Invalid hierarchy JSON: {0}")]
    Json(#[from] serde_json::Error),
}
