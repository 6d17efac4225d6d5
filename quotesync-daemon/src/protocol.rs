//! Socket wire format: one JSON object per line in each direction.
//!
//! ```text
//! → {"cmd":"status"}            ← {"reply":"status", "running":true, ...}
//! → {"cmd":"sync"}              ← {"reply":"synced", "source":"socket", "report":{...}, ...}
//! → {"cmd":"stop"}              ← {"reply":"stopping"}
//! → anything unparseable        ← {"reply":"error", "message":"..."}
//! ```

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use quotesync_sync::{SyncMode, SyncReport};

use crate::error::{io_err, DaemonError};
use crate::paths::socket_path;

/// A command sent to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum DaemonRequest {
    Status,
    Sync,
    Stop,
}

/// The daemon's answer to one [`DaemonRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum DaemonReply {
    Status(DaemonStatus),
    Synced(SyncSummary),
    Stopping,
    Error { message: String },
}

/// What triggered a daemon sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSource {
    Timer,
    Socket,
}

/// Result of one sync run inside the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub source: SyncSource,
    pub mode: SyncMode,
    pub report: SyncReport,
    pub message: String,
    pub duration_ms: u64,
}

/// Snapshot returned by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub running: bool,
    pub started_at_unix: u64,
    pub interval_secs: u64,
    pub remote_url: String,
    pub sync_count: u64,
    /// Zero until a sync has applied changes.
    pub last_sync_at_unix: u64,
    pub last_sync: Option<SyncSummary>,
    pub socket: String,
    pub store: String,
}

/// Send one request to the daemon socket and read one reply.
pub fn send_request(home: &Path, request: DaemonRequest) -> Result<DaemonReply, DaemonError> {
    let socket = socket_path(home);
    if !socket.exists() {
        return Err(DaemonError::DaemonNotRunning { socket });
    }

    let stream = UnixStream::connect(&socket).map_err(|err| match err.kind() {
        ErrorKind::NotFound | ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => {
            DaemonError::DaemonNotRunning {
                socket: socket.clone(),
            }
        }
        _ => io_err(&socket, err),
    })?;

    let mut line = serde_json::to_string(&request)?;
    line.push('\n');
    let mut writer = &stream;
    writer
        .write_all(line.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| io_err(&socket, e))?;

    let mut reply = String::new();
    let read = BufReader::new(&stream)
        .read_line(&mut reply)
        .map_err(|e| io_err(&socket, e))?;
    if read == 0 {
        return Err(DaemonError::Protocol(format!(
            "daemon closed the connection without answering {request:?}"
        )));
    }

    Ok(serde_json::from_str(reply.trim_end())?)
}

/// Query runtime status, retrying briefly while a just-started daemon binds its socket.
pub fn request_status(home: &Path) -> Result<DaemonStatus, DaemonError> {
    const ATTEMPTS: usize = 5;

    let mut attempt = 1;
    loop {
        match send_request(home, DaemonRequest::Status) {
            Ok(DaemonReply::Status(status)) => return Ok(status),
            Ok(other) => return Err(unexpected(DaemonRequest::Status, other)),
            Err(DaemonError::DaemonNotRunning { .. }) if attempt < ATTEMPTS => {
                attempt += 1;
                sleep(Duration::from_millis(100));
            }
            Err(err) => return Err(err),
        }
    }
}

pub fn request_stop(home: &Path) -> Result<(), DaemonError> {
    match send_request(home, DaemonRequest::Stop)? {
        DaemonReply::Stopping => Ok(()),
        other => Err(unexpected(DaemonRequest::Stop, other)),
    }
}

/// Ask the daemon to run an automatic sync now and wait for its summary.
pub fn request_sync(home: &Path) -> Result<SyncSummary, DaemonError> {
    match send_request(home, DaemonRequest::Sync)? {
        DaemonReply::Synced(summary) => Ok(summary),
        other => Err(unexpected(DaemonRequest::Sync, other)),
    }
}

fn unexpected(request: DaemonRequest, reply: DaemonReply) -> DaemonError {
    match reply {
        DaemonReply::Error { message } => DaemonError::Protocol(message),
        other => DaemonError::Protocol(format!("unexpected reply to {request:?}: {other:?}")),
    }
}
