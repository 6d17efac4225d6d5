//! Domain types for quotesync.
//!
//! A quote is identified by its `text` during reconciliation; there is no other
//! identifier. All types serialize with serde using the field names of the
//! persisted JSON array.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single quote and the category it is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    pub category: String,
}

impl QuoteRecord {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for QuoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.text, self.category)
    }
}

/// Ordered quote list; the sole unit of persisted state.
pub type QuoteList = Vec<QuoteRecord>;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Category selection used when listing or picking a quote.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, record: &QuoteRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => record.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    /// Exactly `"all"` selects everything; any other value is an exact category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(s.to_owned()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
