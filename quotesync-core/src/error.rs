//! Error types for quotesync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from store and key/value operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure, with the path that was being read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save / export path).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A key that cannot be mapped onto a storage file name.
    #[error("invalid storage key '{0}'; expected ASCII letters, digits, '-' or '_'")]
    InvalidKey(String),

    /// A record rejected before mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An import document rejected as a whole.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.quotesync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Reasons a new quote is refused by [`crate::QuoteStore::append`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("quote text must not be empty")]
    EmptyText,

    #[error("quote category must not be empty")]
    EmptyCategory,
}

/// Reasons an import document is refused by [`crate::QuoteStore::import_json`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import document is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("import document must be a JSON array of quotes")]
    NotArray,

    #[error("import document contains no valid quotes")]
    NoValidRecords,
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
