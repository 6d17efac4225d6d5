//! Shared sync pipeline entrypoint used by the CLI and the daemon.
//!
//! fetch → (nothing fetched? report and stop) → [`merge`] → apply policy → save.
//!
//! | mode        | conflicts | behaviour                         |
//! |-------------|-----------|-----------------------------------|
//! | `Automatic` | any       | apply and persist                 |
//! | `Manual`    | 0         | apply and persist, no prompt      |
//! | `Manual`    | > 0       | ask `approve`; decline discards   |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use quotesync_core::{KeyValueStore, QuoteStore};

use crate::reconcile::{merge, MergeOutcome};
use crate::remote::RemoteSource;
use crate::SyncError;

/// Who triggered the sync, which decides whether conflicts need approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Timer-driven; always applies.
    Automatic,
    /// User-initiated; conflicts require approval.
    Manual,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Automatic => write!(f, "automatic"),
            SyncMode::Manual => write!(f, "manual"),
        }
    }
}

/// Why a sync left the store untouched before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoUpdateReason {
    FetchFailed(String),
    EmptyRemote,
}

/// Outcome of one [`run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncReport {
    NoUpdate {
        reason: NoUpdateReason,
    },
    Applied {
        fetched: usize,
        conflicts: usize,
        total: usize,
    },
    Declined {
        fetched: usize,
        conflicts: usize,
    },
}

impl SyncReport {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncReport::Applied { .. })
    }

    pub fn conflicts(&self) -> usize {
        match self {
            SyncReport::Applied { conflicts, .. } | SyncReport::Declined { conflicts, .. } => {
                *conflicts
            }
            SyncReport::NoUpdate { .. } => 0,
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncReport::NoUpdate {
                reason: NoUpdateReason::FetchFailed(err),
            } => write!(f, "no update: failed to fetch server quotes ({err})"),
            SyncReport::NoUpdate {
                reason: NoUpdateReason::EmptyRemote,
            } => write!(f, "no update: server returned no quotes"),
            SyncReport::Applied {
                fetched,
                conflicts: 0,
                total,
            } => write!(f, "synced {fetched} server quotes ({total} total)"),
            SyncReport::Applied {
                fetched,
                conflicts,
                total,
            } => write!(
                f,
                "synced {fetched} server quotes ({total} total); {conflicts} conflicts resolved in favour of the server"
            ),
            SyncReport::Declined { conflicts, .. } => {
                write!(f, "sync declined; {conflicts} conflicts left unresolved")
            }
        }
    }
}

/// Run one reconciliation of `store` against `remote`.
///
/// `approve` is only consulted in [`SyncMode::Manual`] when the merge found
/// conflicts. Fetch failures and empty fetches are reported, not returned as
/// errors; only a failed save is an `Err`.
pub fn run<K, R, A>(
    store: &mut QuoteStore<K>,
    remote: &R,
    mode: SyncMode,
    approve: A,
) -> Result<SyncReport, SyncError>
where
    K: KeyValueStore,
    R: RemoteSource + ?Sized,
    A: FnOnce(&MergeOutcome) -> bool,
{
    let fetched = match remote.fetch() {
        Ok(quotes) if quotes.is_empty() => {
            info!("{mode} sync: server returned no quotes");
            return Ok(SyncReport::NoUpdate {
                reason: NoUpdateReason::EmptyRemote,
            });
        }
        Ok(quotes) => quotes,
        Err(err) => {
            warn!("{mode} sync: fetch failed: {err}");
            return Ok(SyncReport::NoUpdate {
                reason: NoUpdateReason::FetchFailed(err.to_string()),
            });
        }
    };

    let outcome = merge(store.quotes(), &fetched);
    let conflicts = outcome.conflicts;

    let accepted = match mode {
        SyncMode::Automatic => true,
        SyncMode::Manual if !outcome.has_conflicts() => true,
        SyncMode::Manual => approve(&outcome),
    };
    if !accepted {
        info!("{mode} sync: declined with {conflicts} conflicts");
        return Ok(SyncReport::Declined {
            fetched: fetched.len(),
            conflicts,
        });
    }

    let total = outcome.merged.len();
    store.replace_all(outcome.merged)?;
    info!(
        "{mode} sync: applied {} server quotes, {conflicts} conflicts, {total} total",
        fetched.len()
    );
    Ok(SyncReport::Applied {
        fetched: fetched.len(),
        conflicts,
        total,
    })
}
