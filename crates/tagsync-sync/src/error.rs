use tagsync_core::CoreError;
use tagsync_store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("remote api unavailable: {0}")]
    Unavailable(String),
    #[error("remote api rejected edit of post {post_id}: {message}")]
    Rejected { post_id: i64, message: String },
    #[cfg(feature = "api-sync")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "api-sync")]
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
