//! In-memory board state shared by the view, the drag engine, and the
//! enrichment queue.
//!
//! All mutation flows through the optimistic controller's `apply`, never
//! through direct access, so rollback always has a consistent snapshot
//! to restore.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::models::{BoardColumn, Coordinates, Job, JobId, JobStatus};
use super::order::compare_jobs;

/// The board's item list. Owned and injectable — tests construct an
/// independent store per case instead of sharing process-wide state.
#[derive(Debug, Default)]
pub struct BoardStore {
    jobs: Vec<Job>,
}

/// A full copy of the store's state, restorable bit-for-bit.
#[derive(Debug, Clone)]
pub struct Snapshot {
    jobs: Vec<Job>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire item list, e.g. after a remote refresh.
    pub fn replace_all(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            jobs: self.jobs.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.jobs = snapshot.jobs;
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Active jobs in the given column, in presentation order.
    pub fn column_jobs(&self, column: BoardColumn) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active && j.column == column)
            .cloned()
            .collect();
        jobs.sort_by(compare_jobs);
        jobs
    }

    /// Presentation order of ids in the given column.
    pub fn column_order(&self, column: BoardColumn) -> Vec<JobId> {
        self.column_jobs(column).into_iter().map(|j| j.id).collect()
    }

    /// All active jobs, unordered.
    pub fn active_jobs(&self) -> Vec<Job> {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active)
            .cloned()
            .collect()
    }

    /// Reassign a job's column. The caller follows up with `apply_keys`
    /// for the affected columns.
    pub fn set_column(&mut self, id: JobId, column: BoardColumn) {
        if let Some(job) = self.jobs.iter_mut().find(|j| j.id == id) {
            job.column = column;
        }
    }

    /// Apply renormalized sort keys to jobs currently in `column`. Ids
    /// absent from the store, or since moved to another column, are
    /// ignored, so a stale key map never reorders a column it did not
    /// target.
    pub fn apply_keys(&mut self, keys: &HashMap<JobId, f64>, column: BoardColumn) {
        for job in self.jobs.iter_mut() {
            if job.column != column {
                continue;
            }
            if let Some(key) = keys.get(&job.id) {
                job.sort_key = *key;
            }
        }
    }

    pub fn set_coordinates(&mut self, id: JobId, coordinates: Coordinates, formatted: &str) {
        if let Some(job) = self.jobs.iter_mut().find(|j| j.id == id) {
            job.coordinates = Some(coordinates);
            job.formatted_address = Some(formatted.to_string());
        }
    }

    pub fn set_paid(&mut self, id: JobId, paid: bool) {
        if let Some(job) = self.jobs.iter_mut().find(|j| j.id == id) {
            job.paid = paid;
        }
    }

    /// Mirror a CRUD-collaborator delete into the local view.
    pub fn remove(&mut self, id: JobId) {
        self.jobs.retain(|j| j.id != id);
    }

    /// Mirror a CRUD-collaborator insert (e.g. a duplicated job) into
    /// the local view, replacing any stale copy.
    pub fn upsert(&mut self, job: Job) {
        self.jobs.retain(|j| j.id != job.id);
        self.jobs.push(job);
    }
}

/// Shared handle to the board store.
///
/// Wraps `BoardStore` behind `Arc<Mutex>` so the engine, the enrichment
/// queue, and view code can hold clones. Access goes through closures so
/// the guard never crosses an await point.
#[derive(Clone, Default)]
pub struct StoreHandle {
    inner: Arc<Mutex<BoardStore>>,
}

impl StoreHandle {
    pub fn new(store: BoardStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Read-only access to the store.
    pub fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&BoardStore) -> R,
    {
        let guard = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("Store lock poisoned: {}", e))?;
        Ok(f(&guard))
    }

    /// Mutable access to the store.
    pub fn write<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut BoardStore) -> R,
    {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("Store lock poisoned: {}", e))?;
        Ok(f(&mut guard))
    }
}
