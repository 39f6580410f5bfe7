// Error types for the snip console.
// Separates fatal sync failures from recoverable, user-visible rejections.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnipError {
    /// A page fetch failed during navigation. The appended batches can no
    /// longer be trusted to continue the server's order, so this is surfaced
    /// as a full-reload-recommended failure and never retried.
    #[error("sync with the server failed: {0}")]
    Sync(String),

    /// The server rejected a create, edit, or delete and said why. The cache
    /// is left untouched; the user may resubmit.
    #[error("{0}")]
    Rejected(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SnipError>;
