//! External collaborator seams.
//!
//! The engine never talks to the network directly — it goes through
//! these traits. Real implementations live in `sync::http`; tests supply
//! in-memory doubles with failure injection.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::board::models::{BoardColumn, Coordinates, Job, JobId, JobPatch};

/// Abstraction over the remote persistence API for jobs.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Fetch the full item list.
    async fn list_jobs(&self) -> Result<Vec<Job>>;

    /// Reassign a job's column, optionally with an explicit sort key.
    async fn update_job_column(
        &self,
        id: JobId,
        column: BoardColumn,
        sort_key: Option<f64>,
    ) -> Result<()>;

    /// Persist a column's full presentation order. The server assigns
    /// renormalized keys in the given sequence.
    async fn reorder_column(&self, column: BoardColumn, ordered_ids: &[JobId]) -> Result<()>;

    /// Field-level partial update (coordinates, paid flag, …).
    async fn update_job(&self, id: JobId, patch: JobPatch) -> Result<()>;

    async fn delete_job(&self, id: JobId) -> Result<()>;

    async fn duplicate_job(&self, id: JobId) -> Result<Job>;
}

/// Best-match result from the geocoding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub formatted_address: String,
    pub coordinates: Coordinates,
}

/// Abstraction over the geocoding provider. Zero or one best match;
/// multi-candidate disambiguation is not this layer's concern.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeMatch>>;
}
