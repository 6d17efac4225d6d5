//! # quotesync-sync
//!
//! Local/remote reconciliation for the quote list.
//!
//! [`merge`] combines two lists with a remote-wins rule, [`remote`] fetches the
//! remote list, and [`pipeline::run`] applies the manual / automatic policy
//! against a [`quotesync_core::QuoteStore`].

pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod remote;

pub use error::{RemoteError, SyncError};
pub use pipeline::{NoUpdateReason, SyncMode, SyncReport};
pub use reconcile::{merge, CategoryChange, MergeOutcome};
pub use remote::{HttpRemoteSource, RemoteSource};
