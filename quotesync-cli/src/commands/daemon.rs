//! `quotesync daemon` — background automatic-sync lifecycle.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use quotesync_daemon::paths::{socket_path, DEFAULT_SYNC_INTERVAL};
use quotesync_daemon::{
    request_status, request_stop, request_sync, start_blocking, DaemonConfig, DaemonError,
};
use quotesync_sync::remote::DEFAULT_REMOTE_URL;

use super::home;

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Run the daemon in the foreground (timer + sync processor + socket server).
    Start(DaemonStartArgs),
    /// Request graceful daemon shutdown over the Unix socket.
    Stop,
    /// Query daemon runtime status over the Unix socket.
    Status,
    /// Ask the running daemon to sync now.
    Sync,
}

#[derive(Args, Debug)]
pub struct DaemonStartArgs {
    /// Seconds between automatic syncs.
    #[arg(
        long,
        env = "QUOTESYNC_SYNC_INTERVAL_SECS",
        default_value_t = DEFAULT_SYNC_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Endpoint returning a JSON array of posts.
    #[arg(long, env = "QUOTESYNC_REMOTE_URL", default_value = DEFAULT_REMOTE_URL)]
    pub remote_url: String,
}

pub fn run(command: DaemonCommand) -> Result<()> {
    let home = home()?;

    match command {
        DaemonCommand::Start(args) => {
            let mut config = DaemonConfig::new(&home);
            config.interval = Duration::from_secs(args.interval_secs);
            config.remote_url = args.remote_url;
            start_blocking(config).context("daemon exited with error")?;
        }
        DaemonCommand::Stop => match request_stop(&home) {
            Ok(()) => println!("daemon stop requested"),
            Err(DaemonError::DaemonNotRunning { .. }) => {
                println!("daemon is not running");
            }
            Err(err) => return Err(err).context("failed to stop daemon"),
        },
        DaemonCommand::Status => match request_status(&home) {
            Ok(status) => print_json(&status)?,
            Err(DaemonError::DaemonNotRunning { .. }) => {
                print_json(&serde_json::json!({
                    "running": false,
                    "socket": socket_path(&home).display().to_string(),
                }))?;
            }
            Err(err) => return Err(err).context("failed to query daemon status"),
        },
        DaemonCommand::Sync => match request_sync(&home) {
            Ok(summary) => println!("{}", summary.message),
            Err(DaemonError::DaemonNotRunning { .. }) => {
                println!("daemon is not running; use `quotesync sync` instead");
            }
            Err(err) => return Err(err).context("daemon sync failed"),
        },
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to render daemon status JSON")?
    );
    Ok(())
}
