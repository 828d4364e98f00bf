pub mod api;
pub mod error;
pub mod maintenance;

pub use api::{ApiClient, ApiSettings, OfflineEditor, PostEditor, RemotePost};
pub use error::{Result, SyncError};
