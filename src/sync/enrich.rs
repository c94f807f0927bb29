//! Background geocoding enrichment.
//!
//! A sequential, rate-limited worker: at most one task in flight, a
//! fixed cool-down after every attempt, and a task set recomputed from
//! current item state on every iteration rather than persisted. A miss
//! skips the job for the rest of the pass and it re-enters the candidate
//! pool on the next one. Coordinate writes go through the optimistic
//! controller's remote path so they survive a reload and serialize
//! against user edits to the same job.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::board::models::{JobId, JobPatch};
use crate::board::store::BoardStore;
use crate::errors::EnrichError;
use crate::sync::api::{Geocoder, JobsApi};
use crate::sync::mutation::OptimisticController;

/// Addresses shorter than this (trimmed) are considered trivial and
/// never geocoded.
const MIN_ADDRESS_LEN: usize = 4;

/// A derived unit of work: a job lacking coordinates plus its raw
/// address.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichTask {
    pub id: JobId,
    pub address: String,
}

/// Recompute the candidate set from current item state: active jobs with
/// a non-trivial address and no coordinates.
pub fn pending_tasks(store: &BoardStore) -> Vec<EnrichTask> {
    store
        .active_jobs()
        .into_iter()
        .filter_map(|job| {
            let address = job.address.as_deref()?.trim().to_string();
            if address.len() < MIN_ADDRESS_LEN || job.coordinates.is_some() {
                return None;
            }
            Some(EnrichTask {
                id: job.id,
                address,
            })
        })
        .collect()
}

/// Append the country qualifier unless the address already mentions it.
pub fn qualify_address(address: &str, country: &str) -> String {
    if country.is_empty() || address.to_lowercase().contains(&country.to_lowercase()) {
        address.to_string()
    } else {
        format!("{}, {}", address, country)
    }
}

pub struct EnrichmentQueue<A: JobsApi, G: Geocoder> {
    api: Arc<A>,
    geocoder: Arc<G>,
    controller: Arc<OptimisticController>,
    cooldown: Duration,
    country: String,
    in_flight: AtomicBool,
}

impl<A: JobsApi + 'static, G: Geocoder + 'static> EnrichmentQueue<A, G> {
    pub fn new(
        api: Arc<A>,
        geocoder: Arc<G>,
        controller: Arc<OptimisticController>,
        cooldown: Duration,
        country: impl Into<String>,
    ) -> Self {
        Self {
            api,
            geocoder,
            controller,
            cooldown,
            country: country.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Drain the current candidate pool, one task at a time. Returns the
    /// number of jobs enriched, or 0 immediately if a pass is already
    /// running (single-flight).
    pub async fn run_pass(&self) -> usize {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return 0;
        }

        let mut attempted: HashSet<JobId> = HashSet::new();
        let mut enriched = 0;
        loop {
            let next = match self.controller.store().read(pending_tasks) {
                Ok(tasks) => tasks.into_iter().find(|t| !attempted.contains(&t.id)),
                Err(e) => {
                    warn!(error = %e, "enrichment pass aborted, store unavailable");
                    break;
                }
            };
            let Some(task) = next else { break };
            attempted.insert(task.id);

            match self.process(&task).await {
                Ok(()) => {
                    enriched += 1;
                    debug!(id = %task.id, "job enriched with coordinates");
                }
                Err(e) => {
                    // Non-fatal: the job re-enters the pool next pass.
                    debug!(id = %task.id, error = %e, "enrichment attempt skipped");
                }
            }
            // Provider rate limit: cool down whether the attempt
            // succeeded or not.
            sleep(self.cooldown).await;
        }

        self.in_flight.store(false, Ordering::SeqCst);
        enriched
    }

    /// Spawn a pass in the background; call whenever the item list is
    /// refreshed. Re-entrant calls fall out via the single-flight check.
    pub fn spawn_pass(self: Arc<Self>) -> JoinHandle<usize> {
        tokio::spawn(async move { self.run_pass().await })
    }

    async fn process(&self, task: &EnrichTask) -> Result<(), EnrichError> {
        let query = qualify_address(&task.address, &self.country);
        let matched = self
            .geocoder
            .geocode(&query)
            .await
            .map_err(EnrichError::Provider)?
            .ok_or_else(|| EnrichError::NoMatch {
                address: query.clone(),
            })?;

        let id = task.id;
        let coordinates = matched.coordinates;
        let formatted = matched.formatted_address.clone();
        let patch = JobPatch::coordinates(coordinates, matched.formatted_address);
        self.controller
            .apply(
                "enrich_job",
                move |s| s.set_coordinates(id, coordinates, &formatted),
                self.api.update_job(id, patch),
            )
            .await
            .map_err(|e| EnrichError::WriteBack(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::board::models::{BoardColumn, Coordinates, Job, JobStatus};

    fn job(address: Option<&str>, coordinates: Option<Coordinates>, status: JobStatus) -> Job {
        Job {
            id: Uuid::new_v4(),
            column: BoardColumn::Prepare,
            sort_key: 10.0,
            title: "install".into(),
            address: address.map(String::from),
            formatted_address: None,
            coordinates,
            paid: false,
            status,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_pending_tasks_derivation() {
        let mut store = BoardStore::new();
        let candidate = job(Some("Main St 5"), None, JobStatus::Active);
        let enriched = job(
            Some("Side St 2"),
            Some(Coordinates { lat: 1.0, lng: 2.0 }),
            JobStatus::Active,
        );
        let archived = job(Some("Back St 9"), None, JobStatus::Archived);
        let no_address = job(None, None, JobStatus::Active);
        let trivial = job(Some("  x "), None, JobStatus::Active);
        store.replace_all(vec![
            candidate.clone(),
            enriched,
            archived,
            no_address,
            trivial,
        ]);

        let tasks = pending_tasks(&store);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, candidate.id);
        assert_eq!(tasks[0].address, "Main St 5");
    }

    #[test]
    fn test_qualify_address() {
        assert_eq!(
            qualify_address("Main St 5", "Australia"),
            "Main St 5, Australia"
        );
        assert_eq!(
            qualify_address("Main St 5, australia", "Australia"),
            "Main St 5, australia"
        );
        assert_eq!(qualify_address("Main St 5", ""), "Main St 5");
    }
}
