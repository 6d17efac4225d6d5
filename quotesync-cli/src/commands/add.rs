//! `quotesync add <text> --category <name>`

use anyhow::{Context, Result};
use clap::Args;
use quotesync_core::{CategoryFilter, QuoteRecord};

use super::{open_session, open_store, print_quote};

/// Add a quote to the collection.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Quote text. Surrounding whitespace is trimmed.
    pub text: String,

    /// Category for the quote.
    #[arg(long, short = 'c')]
    pub category: String,
}

impl AddArgs {
    pub fn run(self) -> Result<()> {
        let mut store = open_store()?;
        let added = store
            .append(QuoteRecord::new(self.text, self.category))
            .context("could not add quote")?
            .clone();

        // A new quote makes its category the active filter.
        let session = open_session()?;
        session
            .set_last_category(&CategoryFilter::Only(added.category.clone()))
            .context("failed to remember category")?;

        println!("✓ Added quote ({} total)", store.len());
        print_quote(&added);
        Ok(())
    }
}
