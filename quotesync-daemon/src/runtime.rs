use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::time::Instant;

use quotesync_core::{FileKvStore, QuoteStore, SessionState};
use quotesync_sync::{
    pipeline::{self, SyncMode},
    remote::DEFAULT_REMOTE_URL,
    HttpRemoteSource, RemoteSource,
};

use crate::error::{io_err, DaemonError};
use crate::paths::{run_dir, session_dir, socket_path, store_dir, DEFAULT_SYNC_INTERVAL};
use crate::protocol::{DaemonReply, DaemonRequest, DaemonStatus, SyncSource, SyncSummary};
use crate::scheduler::AutoSync;

/// Shared handle to the remote fetch adapter.
pub type SharedRemote = Arc<dyn RemoteSource + Send + Sync>;

/// Daemon settings resolved by the caller (CLI flags / environment).
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub home: PathBuf,
    pub interval: Duration,
    pub remote_url: String,
}

impl DaemonConfig {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            interval: DEFAULT_SYNC_INTERVAL,
            remote_url: DEFAULT_REMOTE_URL.to_string(),
        }
    }
}

struct SyncJob {
    source: SyncSource,
    respond_to: oneshot::Sender<Result<SyncSummary, String>>,
}

/// Runtime counters exposed through `status`.
#[derive(Debug, Clone, Default)]
struct SyncStats {
    sync_count: u64,
    last_sync_at_unix: u64,
    last_summary: Option<SyncSummary>,
}

type SharedStats = Arc<RwLock<SyncStats>>;

/// Start the daemon with the HTTP remote and block the current thread until it exits.
pub fn start_blocking(config: DaemonConfig) -> Result<(), DaemonError> {
    let remote: SharedRemote = Arc::new(HttpRemoteSource::new(config.remote_url.clone()));
    start_blocking_with_remote(config, remote)
}

/// [`start_blocking`] with an injected remote source.
pub fn start_blocking_with_remote(
    config: DaemonConfig,
    remote: SharedRemote,
) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run_with_remote(config, remote))
}

/// Run the daemon runtime against the HTTP remote.
pub async fn run(config: DaemonConfig) -> Result<(), DaemonError> {
    let remote: SharedRemote = Arc::new(HttpRemoteSource::new(config.remote_url.clone()));
    run_with_remote(config, remote).await
}

/// Run the daemon runtime.
///
/// Tasks: periodic scheduler, sync processor (sole consumer of the sync
/// queue), socket server and ctrl-c handler. Any task finishing triggers
/// shutdown of the rest. The socket is bound before any task starts, so a
/// start that loses to a running daemon returns without touching its session.
/// Session state is cleared once a daemon that did start shuts down.
pub async fn run_with_remote(config: DaemonConfig, remote: SharedRemote) -> Result<(), DaemonError> {
    let home = config.home.clone();
    ensure_runtime_dirs(&home)?;
    let listener = bind_socket(&socket_path(&home))?;

    let stats: SharedStats = Arc::new(RwLock::new(SyncStats::default()));
    let started_at_unix = unix_seconds_now();

    let (sync_tx, sync_rx) = mpsc::channel::<SyncJob>(64);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    tracing::info!(
        interval_secs = config.interval.as_secs(),
        remote = %config.remote_url,
        home = %home.display(),
        "quotesync daemon starting",
    );

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        let sync_tx = sync_tx.clone();
        let interval = config.interval;
        tokio::spawn(async move {
            let result = scheduler_task(interval, sync_tx, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        let home = home.clone();
        let stats = stats.clone();
        tokio::spawn(async move {
            let result = sync_processor_task(home, remote, stats, sync_rx, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let socket_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        let config = config.clone();
        let stats = stats.clone();
        let sync_tx = sync_tx.clone();
        tokio::spawn(async move {
            let result = socket_server_task(
                listener,
                config,
                stats,
                sync_tx,
                shutdown.clone(),
                shutdown_rx,
                started_at_unix,
            )
            .await;
            let _ = shutdown.send(());
            result
        })
    };
    drop(sync_tx);

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (scheduler_result, processor_result, socket_result, signal_result) = tokio::join!(
        scheduler_handle,
        processor_handle,
        socket_handle,
        signal_handle
    );

    clear_session(&home);

    handle_join("scheduler", scheduler_result)?;
    handle_join("sync_processor", processor_result)?;
    handle_join("socket_server", socket_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("quotesync daemon stopped");
    Ok(())
}

async fn scheduler_task(
    interval: Duration,
    sync_tx: mpsc::Sender<SyncJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let auto = AutoSync::spawn(interval, move || {
        let sync_tx = sync_tx.clone();
        async move {
            match enqueue_sync(&sync_tx, SyncSource::Timer).await {
                Ok(summary) => tracing::info!(
                    outcome = %summary.message,
                    conflicts = summary.report.conflicts(),
                    duration_ms = summary.duration_ms,
                    "timer-triggered sync completed",
                ),
                Err(err) => tracing::error!(error = %err, "timer-triggered sync failed"),
            }
        }
    });

    let _ = shutdown_rx.recv().await;
    auto.stop().await;
    Ok(())
}

async fn sync_processor_task(
    home: PathBuf,
    remote: SharedRemote,
    stats: SharedStats,
    mut sync_rx: mpsc::Receiver<SyncJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = sync_rx.recv() => {
                let Some(job) = maybe_job else { break };
                let outcome = process_job(&home, remote.clone(), &stats, job.source).await;
                let _ = job.respond_to.send(outcome.map_err(|err| err.to_string()));
            }
        }
    }

    Ok(())
}

/// Load the store fresh, run an automatic sync, and record the outcome.
async fn process_job(
    home: &Path,
    remote: SharedRemote,
    stats: &SharedStats,
    source: SyncSource,
) -> Result<SyncSummary, DaemonError> {
    let started = Instant::now();
    let store_root = store_dir(home);

    let report = tokio::task::spawn_blocking(move || {
        let mut store = QuoteStore::load(FileKvStore::new(store_root));
        pipeline::run(&mut store, &*remote, SyncMode::Automatic, |_| true)
    })
    .await
    .map_err(|err| DaemonError::Protocol(format!("sync task join error: {err}")))??;

    let summary = SyncSummary {
        source,
        mode: SyncMode::Automatic,
        message: report.to_string(),
        report,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };

    let mut guard = stats.write().await;
    guard.sync_count += 1;
    if summary.report.is_applied() {
        guard.last_sync_at_unix = unix_seconds_now();
    }
    guard.last_summary = Some(summary.clone());
    Ok(summary)
}

async fn socket_server_task(
    listener: UnixListener,
    config: DaemonConfig,
    stats: SharedStats,
    sync_tx: mpsc::Sender<SyncJob>,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
    started_at_unix: u64,
) -> Result<(), DaemonError> {
    let socket = socket_path(&config.home);
    let config = Arc::new(config);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let config = config.clone();
                let stats = stats.clone();
                let sync_tx = sync_tx.clone();
                let shutdown_tx = shutdown_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_socket_client(
                        stream,
                        config,
                        stats,
                        sync_tx,
                        shutdown_tx,
                        started_at_unix,
                    ).await {
                        tracing::error!(error = %err, "socket client error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

async fn handle_socket_client(
    stream: UnixStream,
    config: Arc<DaemonConfig>,
    stats: SharedStats,
    sync_tx: mpsc::Sender<SyncJob>,
    shutdown_tx: broadcast::Sender<()>,
    started_at_unix: u64,
) -> Result<(), DaemonError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("daemon socket read", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<DaemonRequest>(&line) {
            Ok(request) => request,
            Err(err) => {
                let reply = DaemonReply::Error {
                    message: format!("invalid request: {err}"),
                };
                write_reply(&mut writer, &reply).await?;
                continue;
            }
        };

        match request {
            DaemonRequest::Status => {
                let status = build_status(&config, &stats, started_at_unix).await;
                write_reply(&mut writer, &DaemonReply::Status(status)).await?;
            }
            DaemonRequest::Sync => {
                let reply = match enqueue_sync(&sync_tx, SyncSource::Socket).await {
                    Ok(summary) => DaemonReply::Synced(summary),
                    Err(err) => DaemonReply::Error {
                        message: err.to_string(),
                    },
                };
                write_reply(&mut writer, &reply).await?;
            }
            DaemonRequest::Stop => {
                // Ack first; the client must see it before the runtime exits.
                write_reply(&mut writer, &DaemonReply::Stopping).await?;
                let _ = shutdown_tx.send(());
                break;
            }
        }
    }

    Ok(())
}

async fn build_status(
    config: &DaemonConfig,
    stats: &SharedStats,
    started_at_unix: u64,
) -> DaemonStatus {
    let snapshot = stats.read().await.clone();

    DaemonStatus {
        running: true,
        started_at_unix,
        interval_secs: config.interval.as_secs(),
        remote_url: config.remote_url.clone(),
        sync_count: snapshot.sync_count,
        last_sync_at_unix: snapshot.last_sync_at_unix,
        last_sync: snapshot.last_summary,
        socket: socket_path(&config.home).display().to_string(),
        store: store_dir(&config.home).display().to_string(),
    }
}

async fn enqueue_sync(
    sync_tx: &mpsc::Sender<SyncJob>,
    source: SyncSource,
) -> Result<SyncSummary, DaemonError> {
    let (tx, rx) = oneshot::channel();
    sync_tx
        .send(SyncJob {
            source,
            respond_to: tx,
        })
        .await
        .map_err(|_| DaemonError::ChannelClosed("sync queue"))?;

    let outcome = rx
        .await
        .map_err(|_| DaemonError::ChannelClosed("sync response"))?;
    outcome.map_err(DaemonError::Protocol)
}

fn clear_session(home: &Path) {
    let session = SessionState::new(FileKvStore::new(session_dir(home)));
    if let Err(err) = session.clear() {
        tracing::warn!(error = %err, "failed to clear session state");
    }
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(DaemonError::Protocol(format!(
                "daemon socket already in use: {}",
                socket.display()
            )));
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale daemon socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

/// Claim the socket path. Fails if another daemon is answering on it.
fn bind_socket(socket: &Path) -> Result<UnixListener, DaemonError> {
    prepare_socket_for_bind(socket)?;
    let listener = UnixListener::bind(socket).map_err(|e| io_err(socket, e))?;
    set_socket_permissions(socket)?;
    Ok(listener)
}

fn ensure_runtime_dirs(home: &Path) -> Result<(), DaemonError> {
    for dir in [store_dir(home), run_dir(home)] {
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        }
    }
    Ok(())
}

async fn write_reply(writer: &mut OwnedWriteHalf, reply: &DaemonReply) -> Result<(), DaemonError> {
    let payload = serde_json::to_string(reply)?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("daemon socket flush", e))?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), DaemonError> {
    Ok(())
}
