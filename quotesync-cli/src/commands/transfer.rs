//! `quotesync export` / `quotesync import` — JSON documents in and out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use super::open_store;

/// Arguments for `quotesync export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file. Defaults to `quotes-<date>.json` in the current directory;
    /// use `-` for stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn run(self) -> Result<()> {
        let store = open_store()?;
        let json = store.export_json().context("failed to serialize quotes")?;

        let out = self.out.unwrap_or_else(default_export_path);
        if out.as_os_str() == "-" {
            println!("{json}");
            return Ok(());
        }

        std::fs::write(&out, format!("{json}\n"))
            .with_context(|| format!("cannot write '{}'", out.display()))?;
        println!("✓ Exported {} quotes to {}", store.len(), out.display());
        Ok(())
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from(format!("quotes-{}.json", Local::now().format("%Y-%m-%d")))
}

/// Arguments for `quotesync import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file containing an array of `{"text": ..., "category": ...}` objects.
    pub file: PathBuf,
}

impl ImportArgs {
    pub fn run(self) -> Result<()> {
        let document = std::fs::read_to_string(&self.file)
            .with_context(|| format!("cannot read '{}'", self.file.display()))?;

        let mut store = open_store()?;
        let added = store
            .import_json(&document)
            .with_context(|| format!("import of '{}' rejected", self.file.display()))?;

        println!("✓ Imported {added} quotes ({} total)", store.len());
        Ok(())
    }
}
