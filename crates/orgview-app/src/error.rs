use orgview_api::ApiError;
use orgview_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Api(ApiError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ApiError> for DataSourceError {
    fn from(err: ApiError) -> Self {
        if err.is_not_found() {
            DataSourceError::NotFound(err.message)
        } else {
            DataSourceError::Api(err)
        }
    }
}

impl DataSourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataSourceError::NotFound(_))
    }
}
