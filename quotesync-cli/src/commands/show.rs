//! `quotesync show` — print one random quote.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quotesync_core::{pick_random, CategoryFilter};

use super::{open_session, open_store, print_quote};

/// Arguments for `quotesync show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Category to pick from, or "all". Remembered for later calls.
    #[arg(long, short = 'c')]
    pub category: Option<CategoryFilter>,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let store = open_store()?;
        let session = open_session()?;

        let filter = match self.category {
            Some(filter) => {
                session
                    .set_last_category(&filter)
                    .context("failed to remember category")?;
                filter
            }
            None => session.last_category().unwrap_or_default(),
        };

        match pick_random(store.quotes(), &filter, &mut rand::thread_rng()) {
            Some(quote) => {
                print_quote(quote);
                session
                    .set_last_quote(quote)
                    .context("failed to remember last quote")?;
            }
            None => println!("{}", "No quotes in this category yet.".yellow()),
        }
        Ok(())
    }
}
