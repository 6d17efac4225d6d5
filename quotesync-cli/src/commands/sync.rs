//! `quotesync sync` — reconcile with the server now.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quotesync_sync::{
    pipeline::{self, SyncMode, SyncReport},
    remote::DEFAULT_REMOTE_URL,
    CategoryChange, HttpRemoteSource, MergeOutcome,
};

use super::open_store;

/// Arguments for `quotesync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Apply the server's version without asking, as the daemon does.
    #[arg(long)]
    pub auto: bool,

    /// Accept conflicting server changes without prompting.
    #[arg(long, short = 'y', conflicts_with = "auto")]
    pub yes: bool,

    /// Endpoint returning a JSON array of posts.
    #[arg(long, env = "QUOTESYNC_REMOTE_URL", default_value = DEFAULT_REMOTE_URL)]
    pub remote_url: String,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let mut store = open_store()?;
        let remote = HttpRemoteSource::new(self.remote_url.clone());
        let mode = if self.auto {
            SyncMode::Automatic
        } else {
            SyncMode::Manual
        };

        let assume_yes = self.yes;
        let report = pipeline::run(&mut store, &remote, mode, |outcome| {
            describe_conflicts(outcome);
            assume_yes || confirm("Accept the server's version?")
        })
        .with_context(|| format!("sync with '{}' failed", self.remote_url))?;

        match &report {
            SyncReport::Applied { .. } => println!("{} {report}", "✓".green()),
            SyncReport::Declined { .. } => println!("{} {report}", "✗".yellow()),
            SyncReport::NoUpdate { .. } => println!("{} {report}", "·".dimmed()),
        }
        Ok(())
    }
}

/// One line per conflict the merge counted.
fn describe_conflicts(outcome: &MergeOutcome) {
    println!(
        "{} {} conflicts with the server:",
        "!".yellow().bold(),
        outcome.conflicts
    );
    for change in &outcome.changes {
        println!("{}", conflict_line(change));
    }
}

fn conflict_line(change: &CategoryChange) -> String {
    format!(
        "  \"{}\": {} → {}",
        change.text,
        change.local.red(),
        change.remote.green()
    )
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use quotesync_core::QuoteRecord;
    use quotesync_sync::merge;

    use super::*;

    #[test]
    fn one_line_per_counted_conflict_with_duplicate_local_texts() {
        colored::control::set_override(false);
        let local = vec![QuoteRecord::new("t", "A"), QuoteRecord::new("t", "A")];
        let outcome = merge(&local, &[QuoteRecord::new("t", "B")]);

        let lines: Vec<String> = outcome.changes.iter().map(conflict_line).collect();
        assert_eq!(lines.len(), outcome.conflicts);
        assert_eq!(lines, vec!["  \"t\": A → B".to_string()]);
    }
}
