//! quotesync — quote collection with server reconciliation.
//!
//! # Usage
//!
//! ```text
//! quotesync show [--category <name|all>]
//! quotesync add <text> --category <name>
//! quotesync list [--category <name|all>] [--json]
//! quotesync categories
//! quotesync export [--out <file>]
//! quotesync import <file>
//! quotesync sync [--auto] [--yes] [--remote-url <url>]
//! quotesync daemon start|stop|status|sync
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    add::AddArgs,
    daemon::DaemonCommand,
    list::{CategoriesArgs, ListArgs},
    show::ShowArgs,
    sync::SyncArgs,
    transfer::{ExportArgs, ImportArgs},
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "quotesync",
    version,
    about = "Keep a quote collection and reconcile it with a server",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a random quote, optionally from one category.
    Show(ShowArgs),

    /// Add a new quote.
    Add(AddArgs),

    /// List stored quotes.
    List(ListArgs),

    /// List distinct categories in first-seen order.
    Categories(CategoriesArgs),

    /// Write all quotes as a pretty-printed JSON document.
    Export(ExportArgs),

    /// Append quotes from a JSON document.
    Import(ImportArgs),

    /// Reconcile local quotes with the server (server wins on conflicts).
    Sync(SyncArgs),

    /// Manage the background automatic-sync daemon.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Show(args) => args.run(),
        Commands::Add(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Categories(args) => args.run(),
        Commands::Export(args) => args.run(),
        Commands::Import(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Daemon { command } => commands::daemon::run(command),
    }
}
