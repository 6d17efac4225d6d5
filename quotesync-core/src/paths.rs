//! On-disk layout.
//!
//! ```text
//! ~/.quotesync/
//!   store/
//!     quotes.json        (persisted quote list, mode 0600)
//!   run/
//!     session/           (session-scoped cosmetic state)
//! ```
//!
//! Every helper takes an explicit `home`; tests pass a `TempDir`. [`home`]
//! resolves the real one for binaries.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub fn quotesync_root(home: &Path) -> PathBuf {
    home.join(".quotesync")
}

/// Directory backing the persistent [`crate::FileKvStore`].
pub fn store_dir(home: &Path) -> PathBuf {
    quotesync_root(home).join("store")
}

pub fn run_dir(home: &Path) -> PathBuf {
    quotesync_root(home).join("run")
}

/// Directory backing the session [`crate::FileKvStore`].
pub fn session_dir(home: &Path) -> PathBuf {
    run_dir(home).join("session")
}

/// The current user's home directory.
pub fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}
