pub mod add;
pub mod daemon;
pub mod list;
pub mod show;
pub mod sync;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use quotesync_core::{paths, FileKvStore, QuoteRecord, QuoteStore, SessionState};

pub(crate) fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// The persistent quote store under `~/.quotesync/store/`.
pub(crate) fn open_store() -> Result<QuoteStore<FileKvStore>> {
    Ok(QuoteStore::load(FileKvStore::new(paths::store_dir(&home()?))))
}

pub(crate) fn open_session() -> Result<SessionState<FileKvStore>> {
    Ok(SessionState::new(FileKvStore::new(paths::session_dir(
        &home()?,
    ))))
}

pub(crate) fn print_quote(quote: &QuoteRecord) {
    use colored::Colorize;

    println!("\"{}\"", quote.text);
    println!("  {} {}", "Category:".bold(), quote.category);
}
