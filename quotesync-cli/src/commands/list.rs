//! `quotesync list` and `quotesync categories`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use quotesync_core::{filter_by_category, CategoryFilter, QuoteRecord};

use super::open_store;

/// Arguments for `quotesync list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list quotes in this category ("all" for every quote).
    #[arg(long, short = 'c', default_value = "all")]
    pub category: CategoryFilter,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "quote")]
    text: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let store = open_store()?;
        let quotes = filter_by_category(store.quotes(), &self.category);

        if self.json {
            let json = serde_json::to_string_pretty(&quotes).context("failed to render JSON")?;
            println!("{json}");
            return Ok(());
        }

        if quotes.is_empty() {
            println!("{}", "No quotes in this category yet.".yellow());
            return Ok(());
        }

        let rows: Vec<QuoteRow> = quotes
            .iter()
            .enumerate()
            .map(|(i, quote)| QuoteRow {
                index: i + 1,
                category: quote.category.clone(),
                text: quote.text.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!(
            "{} quotes ({} filter)",
            quotes.len(),
            self.category.to_string().cyan()
        );
        Ok(())
    }
}

/// Arguments for `quotesync categories`.
#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CategoryCount<'a> {
    category: &'a str,
    quotes: usize,
}

impl CategoriesArgs {
    pub fn run(self) -> Result<()> {
        let store = open_store()?;
        let categories = store.categories();
        let counts: Vec<CategoryCount<'_>> = categories
            .iter()
            .map(|category| CategoryCount {
                category,
                quotes: count_in(store.quotes(), category),
            })
            .collect();

        if self.json {
            let json = serde_json::to_string_pretty(&counts).context("failed to render JSON")?;
            println!("{json}");
            return Ok(());
        }

        for entry in counts {
            println!("{} ({})", entry.category, entry.quotes);
        }
        Ok(())
    }
}

fn count_in(quotes: &[QuoteRecord], category: &str) -> usize {
    quotes.iter().filter(|q| q.category == category).count()
}
