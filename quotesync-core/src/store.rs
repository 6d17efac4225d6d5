//! The quote store: single source of truth for the quote list.
//!
//! # Persistence
//!
//! The whole list lives under one key ([`QUOTES_KEY`]) as a JSON array of
//! `{text, category}` objects. Every successful mutation rewrites it in full.
//!
//! # Load fallback
//!
//! A missing, unreadable, malformed or non-array value is replaced by
//! [`default_quotes`], which is written back immediately so the next load sees
//! a well-formed list. Array elements are not checked for empty fields; only
//! elements that do not have the record shape at all are skipped.

use std::collections::HashSet;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::error::{ImportError, StoreError, ValidationError};
use crate::kv::KeyValueStore;
use crate::types::{CategoryFilter, QuoteList, QuoteRecord};

/// Storage key holding the persisted quote list.
pub const QUOTES_KEY: &str = "quotes";

/// Built-in list used whenever persisted state is absent or unusable.
pub fn default_quotes() -> QuoteList {
    vec![
        QuoteRecord::new("The future depends on what you do today.", "Motivation"),
        QuoteRecord::new("Learning never exhausts the mind.", "Education"),
        QuoteRecord::new("Action is the foundational key to all success.", "Motivation"),
        QuoteRecord::new(
            "Code is like humor. When you have to explain it, it’s bad.",
            "Programming",
        ),
        QuoteRecord::new(
            "The only way to learn a new programming language is by writing programs in it.",
            "Programming",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory quote list mirrored to a [`KeyValueStore`].
#[derive(Debug)]
pub struct QuoteStore<K> {
    kv: K,
    quotes: QuoteList,
}

impl<K: KeyValueStore> QuoteStore<K> {
    /// Restore the list from `kv`, falling back to (and persisting) the defaults.
    ///
    /// Never fails: storage problems degrade to the default list and are logged.
    pub fn load(kv: K) -> Self {
        let quotes = match read_persisted(&kv) {
            Some(quotes) => quotes,
            None => {
                let defaults = default_quotes();
                if let Err(err) = write_list(&kv, &defaults) {
                    warn!("failed to persist default quotes: {err}");
                }
                defaults
            }
        };
        Self { kv, quotes }
    }

    pub fn quotes(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Serialize the full list and overwrite the persisted value.
    pub fn save(&self) -> Result<(), StoreError> {
        write_list(&self.kv, &self.quotes)
    }

    /// Validate and append one quote, then persist.
    ///
    /// Both fields are trimmed; an empty field rejects the record without
    /// touching the list. Returns the record as stored.
    pub fn append(&mut self, record: QuoteRecord) -> Result<&QuoteRecord, StoreError> {
        let text = record.text.trim();
        let category = record.category.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory.into());
        }

        self.quotes.push(QuoteRecord::new(text, category));
        if let Err(err) = self.save() {
            self.quotes.pop();
            return Err(err);
        }
        Ok(&self.quotes[self.quotes.len() - 1])
    }

    /// Overwrite the whole list (e.g. with a merge result) and persist.
    pub fn replace_all(&mut self, quotes: QuoteList) -> Result<(), StoreError> {
        let previous = std::mem::replace(&mut self.quotes, quotes);
        if let Err(err) = self.save() {
            self.quotes = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Append every valid quote from a JSON document, then persist.
    ///
    /// The document must be an array. Elements whose `text` and `category` are
    /// both strings are kept; everything else is dropped. If nothing survives
    /// the import is rejected and the list is unchanged. Returns the number of
    /// quotes appended.
    pub fn import_json(&mut self, document: &str) -> Result<usize, StoreError> {
        let imported = parse_import(document)?;
        let count = imported.len();
        let before = self.quotes.len();

        self.quotes.extend(imported);
        if let Err(err) = self.save() {
            self.quotes.truncate(before);
            return Err(err);
        }
        debug!("imported {count} quotes");
        Ok(count)
    }

    /// Pretty-printed JSON array of the current list.
    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.quotes)?)
    }

    /// Distinct categories of the current list, in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        categories(&self.quotes)
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Distinct category values in first-seen order.
pub fn categories(quotes: &[QuoteRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for quote in quotes {
        if seen.insert(quote.category.as_str()) {
            ordered.push(quote.category.clone());
        }
    }
    ordered
}

pub fn filter_by_category<'a>(
    quotes: &'a [QuoteRecord],
    filter: &CategoryFilter,
) -> Vec<&'a QuoteRecord> {
    quotes.iter().filter(|q| filter.matches(q)).collect()
}

/// A uniformly random quote among those matching `filter`; `None` if none match.
pub fn pick_random<'a, R: Rng + ?Sized>(
    quotes: &'a [QuoteRecord],
    filter: &CategoryFilter,
    rng: &mut R,
) -> Option<&'a QuoteRecord> {
    filter_by_category(quotes, filter).choose(rng).copied()
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn write_list<K: KeyValueStore>(kv: &K, quotes: &[QuoteRecord]) -> Result<(), StoreError> {
    let json = serde_json::to_string(quotes)?;
    kv.set(QUOTES_KEY, &json)
}

fn read_persisted<K: KeyValueStore>(kv: &K) -> Option<QuoteList> {
    let raw = match kv.get(QUOTES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no persisted quotes; using defaults");
            return None;
        }
        Err(err) => {
            warn!("failed to read persisted quotes, using defaults: {err}");
            return None;
        }
    };

    let items = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("persisted quotes are not a JSON array; using defaults");
            return None;
        }
        Err(err) => {
            warn!("persisted quotes are not valid JSON, using defaults: {err}");
            return None;
        }
    };

    let mut quotes = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<QuoteRecord>(item) {
            Ok(record) => quotes.push(record),
            Err(err) => warn!("skipping persisted quote #{index}: {err}"),
        }
    }
    Some(quotes)
}

fn parse_import(document: &str) -> Result<QuoteList, ImportError> {
    let value: Value = serde_json::from_str(document).map_err(ImportError::Parse)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotArray);
    };

    let quotes: QuoteList = items
        .iter()
        .filter_map(|item| {
            let text = item.get("text")?.as_str()?;
            let category = item.get("category")?.as_str()?;
            Some(QuoteRecord::new(text, category))
        })
        .collect();

    if quotes.is_empty() {
        return Err(ImportError::NoValidRecords);
    }
    Ok(quotes)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn persisted(kv: &MemoryKvStore) -> QuoteList {
        let raw = kv.get(QUOTES_KEY).unwrap().expect("quotes persisted");
        serde_json::from_str(&raw).expect("valid json")
    }

    #[test]
    fn load_empty_storage_uses_and_persists_defaults() {
        let kv = MemoryKvStore::new();
        let store = QuoteStore::load(&kv);
        assert_eq!(store.quotes(), default_quotes().as_slice());
        assert_eq!(persisted(&kv), default_quotes());
    }

    #[test]
    fn load_non_array_falls_back() {
        let kv = MemoryKvStore::with_entry(QUOTES_KEY, r#"{"text":"x","category":"y"}"#);
        let store = QuoteStore::load(&kv);
        assert_eq!(store.quotes(), default_quotes().as_slice());
    }

    #[test]
    fn load_keeps_empty_fields_as_is() {
        let kv = MemoryKvStore::with_entry(QUOTES_KEY, r#"[{"text":"","category":" "}]"#);
        let store = QuoteStore::load(&kv);
        assert_eq!(store.quotes(), &[QuoteRecord::new("", " ")]);
    }

    #[test]
    fn load_skips_elements_without_record_shape() {
        let kv = MemoryKvStore::with_entry(
            QUOTES_KEY,
            r#"[{"text":"a","category":"b"}, 42, {"text":"c"}]"#,
        );
        let store = QuoteStore::load(&kv);
        assert_eq!(store.quotes(), &[QuoteRecord::new("a", "b")]);
    }

    #[test]
    fn load_empty_array_is_not_replaced_by_defaults() {
        let kv = MemoryKvStore::with_entry(QUOTES_KEY, "[]");
        let store = QuoteStore::load(&kv);
        assert!(store.is_empty());
    }

    #[test]
    fn append_trims_and_persists() {
        let kv = MemoryKvStore::with_entry(QUOTES_KEY, "[]");
        let mut store = QuoteStore::load(&kv);
        let stored = store
            .append(QuoteRecord::new("  Keep going.  ", " Motivation "))
            .expect("append")
            .clone();
        assert_eq!(stored, QuoteRecord::new("Keep going.", "Motivation"));
        assert_eq!(persisted(&kv), vec![stored]);
    }

    #[test]
    fn append_rejects_blank_fields_without_mutation() {
        let kv = MemoryKvStore::with_entry(QUOTES_KEY, "[]");
        let mut store = QuoteStore::load(&kv);

        let err = store.append(QuoteRecord::new("   ", "x")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptyText)));

        let err = store.append(QuoteRecord::new("x", "")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptyCategory)));

        assert!(store.is_empty());
        assert_eq!(persisted(&kv), Vec::<QuoteRecord>::new());
    }

    #[test]
    fn replace_all_persists_new_list() {
        let kv = MemoryKvStore::new();
        let mut store = QuoteStore::load(&kv);
        let next = vec![QuoteRecord::new("A", "N")];
        store.replace_all(next.clone()).expect("replace");
        assert_eq!(store.quotes(), next.as_slice());
        assert_eq!(persisted(&kv), next);
    }

    #[test]
    fn import_appends_only_string_pairs() {
        let kv = MemoryKvStore::with_entry(QUOTES_KEY, "[]");
        let mut store = QuoteStore::load(&kv);
        let added = store
            .import_json(r#"[{"text":"x","category":"y"},{"bad":1},{"text":1,"category":"z"}]"#)
            .expect("import");
        assert_eq!(added, 1);
        assert_eq!(store.quotes(), &[QuoteRecord::new("x", "y")]);
    }

    #[test]
    fn import_rejections_leave_list_unchanged() {
        let kv = MemoryKvStore::new();
        let mut store = QuoteStore::load(&kv);

        let err = store.import_json(r#"[{"bad":1}]"#).unwrap_err();
        assert!(matches!(err, StoreError::Import(ImportError::NoValidRecords)));

        let err = store.import_json(r#"{"text":"x","category":"y"}"#).unwrap_err();
        assert!(matches!(err, StoreError::Import(ImportError::NotArray)));

        let err = store.import_json("not json").unwrap_err();
        assert!(matches!(err, StoreError::Import(ImportError::Parse(_))));

        assert_eq!(store.quotes(), default_quotes().as_slice());
    }

    #[test]
    fn import_does_not_dedupe_against_existing() {
        let kv = MemoryKvStore::new();
        let mut store = QuoteStore::load(&kv);
        let first = default_quotes().remove(0);
        let doc = serde_json::to_string(&vec![first.clone()]).unwrap();
        store.import_json(&doc).expect("import");
        assert_eq!(store.len(), default_quotes().len() + 1);
        assert_eq!(store.quotes().last(), Some(&first));
    }

    #[test]
    fn export_is_pretty_and_parses_back() {
        let kv = MemoryKvStore::new();
        let store = QuoteStore::load(&kv);
        let json = store.export_json().expect("export");
        assert!(json.contains("\n  {"), "expected indented output: {json}");
        let parsed: QuoteList = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, default_quotes());
    }

    #[test]
    fn categories_are_first_seen_order() {
        assert_eq!(
            categories(&default_quotes()),
            vec!["Motivation", "Education", "Programming"]
        );
    }

    #[test]
    fn categories_follow_mutations() {
        let kv = MemoryKvStore::new();
        let mut store = QuoteStore::load(&kv);
        store.append(QuoteRecord::new("New", "Science")).unwrap();
        assert_eq!(store.categories().last().map(String::as_str), Some("Science"));
    }

    #[test]
    fn pick_random_respects_filter() {
        let quotes = default_quotes();
        let mut rng = StdRng::seed_from_u64(7);
        let filter = CategoryFilter::Only("Education".into());
        for _ in 0..10 {
            let picked = pick_random(&quotes, &filter, &mut rng).expect("one match");
            assert_eq!(picked.category, "Education");
        }
    }

    #[test]
    fn pick_random_empty_category_is_none() {
        let quotes = default_quotes();
        let mut rng = StdRng::seed_from_u64(7);
        let filter = CategoryFilter::Only("Nope".into());
        assert!(pick_random(&quotes, &filter, &mut rng).is_none());
    }
}
