//! Board engine: turns settled drop plans and board edits into ordered,
//! persisted state.
//!
//! Every path goes through the optimistic mutation controller — the view
//! updates synchronously, the remote write follows, and a failed write
//! rolls the view back. A drop that reproduces the current order issues
//! no network call at all.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::errors::SyncError;
use crate::sync::api::JobsApi;
use crate::sync::mutation::OptimisticController;

use super::drag::{DragOutcome, DragSession, DropPlan};
use super::models::{BoardColumn, Job, JobId, JobPatch};
use super::order::{column_sequence, key_between, move_within_list, renormalize};
use super::store::{BoardStore, StoreHandle};

pub struct BoardEngine<A: JobsApi> {
    api: Arc<A>,
    controller: Arc<OptimisticController>,
    show_weekend: bool,
}

impl<A: JobsApi> BoardEngine<A> {
    pub fn new(api: Arc<A>, controller: Arc<OptimisticController>, show_weekend: bool) -> Self {
        Self {
            api,
            controller,
            show_weekend,
        }
    }

    pub fn store(&self) -> &StoreHandle {
        self.controller.store()
    }

    pub fn controller(&self) -> &Arc<OptimisticController> {
        &self.controller
    }

    /// The board's column sequence, left to right.
    pub fn columns(&self) -> Vec<BoardColumn> {
        column_sequence(self.show_weekend)
    }

    /// Replace local state with the remote item list.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let jobs = self.api.list_jobs().await?;
        self.controller
            .store()
            .write(|s| s.replace_all(jobs))
            .map_err(|_| SyncError::LockPoisoned)?;
        Ok(())
    }

    /// A drag session pre-populated with the current board: every active
    /// card under its id string and every column under its name. The
    /// interaction layer registers its own wrapper ids on top.
    pub fn new_drag_session(&self) -> Result<DragSession, SyncError> {
        let mut session = DragSession::new();
        let jobs = self
            .controller
            .store()
            .read(|s| s.active_jobs())
            .map_err(|_| SyncError::LockPoisoned)?;
        for job in jobs {
            session.register_card(job.id.to_string(), job.id, job.column);
        }
        for column in self.columns() {
            session.register_column(column.as_str(), column);
        }
        Ok(session)
    }

    /// Apply a settled drag outcome. Cancelled gestures cost nothing.
    /// Returns whether a write was issued.
    pub async fn handle_drop(&self, outcome: DragOutcome) -> Result<bool, SyncError> {
        match outcome {
            DragOutcome::Cancelled => Ok(false),
            DragOutcome::Dropped(plan) => self.apply_plan(plan).await,
        }
    }

    async fn apply_plan(&self, plan: DropPlan) -> Result<bool, SyncError> {
        self.move_job(plan.picked, plan.column, plan.insert_before)
            .await
    }

    /// Move a job to `target_column`, in front of `insert_before`
    /// (append when `None`). Same-position moves are no-ops with no
    /// network call; everything else renormalizes the target column and
    /// persists as a single optimistic mutation.
    ///
    /// The plan (target order, renormalized keys, provisional key) is
    /// built under the controller's write gate, so a gesture issued
    /// while another write is outstanding plans against settled state,
    /// never against an optimistic update that may still roll back.
    pub async fn move_job(
        &self,
        id: JobId,
        target_column: BoardColumn,
        insert_before: Option<JobId>,
    ) -> Result<bool, SyncError> {
        if insert_before == Some(id) {
            return Ok(false);
        }

        let api = self.api.clone();
        self.controller
            .apply_planned("move_job", move |s| {
                let current_column = s
                    .get(id)
                    .map(|j| j.column)
                    .ok_or(SyncError::UnknownJob { id })?;
                let current_order = s.column_order(current_column);

                let target_ids = if target_column == current_column {
                    // Array-level reorder within one column.
                    let from = current_order
                        .iter()
                        .position(|other| *other == id)
                        .ok_or(SyncError::UnknownJob { id })?;
                    let to = current_order
                        .iter()
                        .filter(|other| **other != id)
                        .position(|other| insert_before == Some(*other))
                        .unwrap_or(current_order.len() - 1);
                    move_within_list(&current_order, from, to)
                } else {
                    // Splice into the target column's existing sequence.
                    let mut ids = s.column_order(target_column);
                    let index = insert_before
                        .and_then(|before| ids.iter().position(|other| *other == before))
                        .unwrap_or(ids.len());
                    ids.insert(index, id);
                    ids
                };

                if target_column == current_column && target_ids == current_order {
                    debug!(%id, column = %target_column, "drop reproduces current order, skipping");
                    return Ok(None);
                }

                let keys = renormalize(&target_ids);
                let local = move |store: &mut BoardStore| {
                    if target_column != current_column {
                        store.set_column(id, target_column);
                    }
                    store.apply_keys(&keys, target_column);
                };

                let remote: Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> =
                    if target_column == current_column {
                        let remote_ids = target_ids;
                        Box::pin(async move {
                            api.reorder_column(target_column, &remote_ids).await
                        })
                    } else {
                        // Provisional key between the new neighbors; the
                        // follow-up batch reorder renormalizes the whole
                        // column to multiples of ten.
                        let position = target_ids
                            .iter()
                            .position(|other| *other == id)
                            .unwrap_or(0);
                        let before_key = position
                            .checked_sub(1)
                            .and_then(|i| target_ids.get(i))
                            .and_then(|prev| s.get(*prev))
                            .map(|j| j.sort_key);
                        let after_key = target_ids
                            .get(position + 1)
                            .and_then(|next| s.get(*next))
                            .map(|j| j.sort_key);
                        let moved_key = key_between(before_key, after_key);
                        let remote_ids = target_ids;
                        Box::pin(async move {
                            api.update_job_column(id, target_column, Some(moved_key))
                                .await?;
                            api.reorder_column(target_column, &remote_ids).await
                        })
                    };

                Ok(Some((local, remote)))
            })
            .await
    }

    /// Jump a job to the front of its current column.
    pub async fn jump_to_start(&self, id: JobId) -> Result<bool, SyncError> {
        let (column, first) = self.column_edges(id)?;
        match first {
            Some(first) if first != id => self.move_job(id, column, Some(first)).await,
            _ => Ok(false),
        }
    }

    /// Jump a job to the back of its current column.
    pub async fn jump_to_end(&self, id: JobId) -> Result<bool, SyncError> {
        let (column, _) = self.column_edges(id)?;
        self.move_job(id, column, None).await
    }

    fn column_edges(&self, id: JobId) -> Result<(BoardColumn, Option<JobId>), SyncError> {
        let store = self.controller.store();
        let column = store
            .read(|s| s.get(id).map(|j| j.column))
            .map_err(|_| SyncError::LockPoisoned)?
            .ok_or(SyncError::UnknownJob { id })?;
        let first = store
            .read(|s| s.column_order(column).first().copied())
            .map_err(|_| SyncError::LockPoisoned)?;
        Ok((column, first))
    }

    /// Toggle a job's paid flag through the optimistic path.
    pub async fn set_paid(&self, id: JobId, paid: bool) -> Result<(), SyncError> {
        self.controller
            .apply(
                "update_job",
                |s| s.set_paid(id, paid),
                self.api.update_job(id, JobPatch::paid(paid)),
            )
            .await
    }

    /// Pass-through delete: the CRUD collaborator owns the lifecycle,
    /// the engine just mirrors it locally and rolls back like any other
    /// mutation.
    pub async fn delete_job(&self, id: JobId) -> Result<(), SyncError> {
        self.controller
            .apply("delete_job", |s| s.remove(id), self.api.delete_job(id))
            .await
    }

    /// Pass-through duplicate. Not optimistic — the server mints the new
    /// job — so the local insert follows the confirmed response.
    pub async fn duplicate_job(&self, id: JobId) -> Result<Job, SyncError> {
        let job = self.api.duplicate_job(id).await?;
        self.controller
            .store()
            .write(|s| s.upsert(job.clone()))
            .map_err(|_| SyncError::LockPoisoned)?;
        self.controller.notify();
        Ok(job)
    }
}
