use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid tag name")]
    InvalidTagName,
    #[error("invalid post id: {0}")]
    InvalidPostId(String),
}
