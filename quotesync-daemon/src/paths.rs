use std::path::{Path, PathBuf};
use std::time::Duration;

pub use quotesync_core::paths::{quotesync_root, run_dir, session_dir, store_dir};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

pub const DAEMON_SOCKET: &str = "quotesync.sock";

pub fn socket_path(home: &Path) -> PathBuf {
    quotesync_root(home).join(DAEMON_SOCKET)
}
