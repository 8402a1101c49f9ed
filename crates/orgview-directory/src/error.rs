use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Failed to read directory file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid directory data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Person not found: {0}")]
    PersonNotFound(String),
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),
}
