//! Error types for quotesync-sync.

use thiserror::Error;

use quotesync_core::StoreError;

/// Errors that abort a sync run. Fetch failures are not among them; the
/// pipeline reports those as [`crate::SyncReport::NoUpdate`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// Persisting the merged list failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures of the remote fetch adapter.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connection, TLS, timeout or non-success HTTP status.
    #[error("remote transport error: {0}")]
    Transport(String),

    /// The response body was not the expected JSON shape.
    #[error("remote payload error: {0}")]
    Decode(String),
}

impl From<ureq::Error> for RemoteError {
    fn from(err: ureq::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}
