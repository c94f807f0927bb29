//! crewboard — job-board ordering and synchronization engine.
//!
//! The shared board lets several operators drag, reorder, and re-column
//! work items while the authoritative state lives on a remote API and a
//! background geocoder enriches the same records. This crate is the
//! client-side core: sort-key math, the drag state machine, optimistic
//! mutation with rollback, the cross-view change signal, and the
//! rate-limited enrichment queue. Rendering, forms, and the CRUD screens
//! around it are the host application's business.

pub mod board;
pub mod config;
pub mod errors;
pub mod logging;
pub mod sync;

pub use board::engine::BoardEngine;
pub use board::models::{BoardColumn, Coordinates, Job, JobId, JobPatch, JobStatus};
pub use config::BoardConfig;
pub use errors::{EnrichError, SyncError};
pub use sync::broadcast::{ChangeBroadcaster, ChangeChannel};
pub use sync::enrich::EnrichmentQueue;
pub use sync::mutation::OptimisticController;
