//! Session-scoped cosmetic state: the last category filter and the last quote shown.
//!
//! Kept in its own [`KeyValueStore`] so clearing it never touches the quote
//! list. Reads are best-effort; anything unreadable is treated as unset.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::types::{CategoryFilter, QuoteRecord};

pub const LAST_CATEGORY_KEY: &str = "lastCategory";
pub const LAST_QUOTE_KEY: &str = "lastQuote";

/// The most recently displayed quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastViewed {
    pub quote: QuoteRecord,
    pub viewed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionState<K> {
    kv: K,
}

impl<K: KeyValueStore> SessionState<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn last_category(&self) -> Option<CategoryFilter> {
        let raw = self.read(LAST_CATEGORY_KEY)?;
        let name: String = serde_json::from_str(&raw).ok()?;
        name.parse().ok()
    }

    pub fn set_last_category(&self, filter: &CategoryFilter) -> Result<(), StoreError> {
        let json = serde_json::to_string(&filter.to_string())?;
        self.kv.set(LAST_CATEGORY_KEY, &json)
    }

    pub fn last_quote(&self) -> Option<LastViewed> {
        let raw = self.read(LAST_QUOTE_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_last_quote(&self, quote: &QuoteRecord) -> Result<(), StoreError> {
        let viewed = LastViewed {
            quote: quote.clone(),
            viewed_at: Utc::now(),
        };
        self.kv.set(LAST_QUOTE_KEY, &serde_json::to_string(&viewed)?)
    }

    /// End of session: forget everything.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(LAST_CATEGORY_KEY)?;
        self.kv.remove(LAST_QUOTE_KEY)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("ignoring unreadable session key '{key}': {err}");
                None
            }
        }
    }
}
