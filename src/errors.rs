//! Typed error hierarchy for the board engine.
//!
//! Two top-level enums cover the two failure surfaces:
//! - `SyncError` — optimistic mutation and drop-resolution failures
//! - `EnrichError` — background geocoding failures
//!
//! Nothing here ever escapes the engine uncaught: a `RemoteWrite` has
//! already been compensated by rollback when the caller sees it, and
//! enrichment errors only feed the skip-and-retry-later path.

use thiserror::Error;

use crate::board::models::JobId;

/// Errors from the optimistic mutation path and the board engine.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Remote write for '{op}' failed, local change rolled back: {source}")]
    RemoteWrite {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unknown job {id}")]
    UnknownJob { id: JobId },

    #[error("Board state lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from a single enrichment attempt.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("No geocoding match for address '{address}'")]
    NoMatch { address: String },

    #[error("Geocoding provider error: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("Coordinate write-back failed: {0}")]
    WriteBack(#[source] Box<SyncError>),
}
