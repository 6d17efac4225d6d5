//! Background automatic sync: periodic timer + single sync processor + socket server.

mod error;
pub mod paths;
pub mod protocol;
mod runtime;
pub mod scheduler;

pub use error::DaemonError;
pub use protocol::{
    request_status, request_stop, request_sync, send_request, DaemonReply, DaemonRequest,
    DaemonStatus, SyncSource, SyncSummary,
};
pub use runtime::{
    run, run_with_remote, start_blocking, start_blocking_with_remote, DaemonConfig, SharedRemote,
};
pub use scheduler::AutoSync;
