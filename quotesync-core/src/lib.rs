//! quotesync core library — quote types, key/value persistence, the quote store.
//!
//! Public API surface:
//! - [`types`] — [`QuoteRecord`], [`QuoteList`], [`CategoryFilter`]
//! - [`error`] — [`StoreError`], [`ValidationError`], [`ImportError`]
//! - [`kv`] — the [`KeyValueStore`] capability and its file / memory backends
//! - [`store`] — load / save / append / import / export, category index
//! - [`session`] — cosmetic per-session state (last filter, last quote)
//! - [`paths`] — on-disk layout under `~/.quotesync/`

pub mod error;
pub mod kv;
pub mod paths;
pub mod session;
pub mod store;
pub mod types;

pub use error::{ImportError, StoreError, ValidationError};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use session::SessionState;
pub use store::{categories, default_quotes, filter_by_category, pick_random, QuoteStore};
pub use types::{CategoryFilter, QuoteList, QuoteRecord};
