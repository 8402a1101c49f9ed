use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("No hierarchy data to display")]
    NoData,
    #[error("Invalid node key: {0}")]
    InvalidKey(String),
    #[error("Node {0} is not visible in the current diagram")]
    NodeNotVisible(String),
}
