//! Optimistic mutation controller.
//!
//! The single choke point for board mutations: snapshot, apply the local
//! update synchronously so the view reflects it with zero perceived
//! latency, fire the remote write, and on failure restore the snapshot.
//! Success publishes a change notification so sibling views refresh.
//! There is no automatic retry — a fresh gesture or a full reload is
//! required after a rollback.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::warn;

use crate::board::store::{BoardStore, StoreHandle};
use crate::errors::SyncError;
use crate::sync::broadcast::ChangeBroadcaster;

pub struct OptimisticController {
    store: StoreHandle,
    broadcaster: ChangeBroadcaster,
    /// Serializes writes: a gesture issued while another write is
    /// outstanding waits for settlement and then takes its own snapshot,
    /// so rollback never restores over a later mutation.
    write_gate: Mutex<()>,
}

impl OptimisticController {
    pub fn new(store: StoreHandle, broadcaster: ChangeBroadcaster) -> Self {
        Self {
            store,
            broadcaster,
            write_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Publish a change notification outside the apply path (used by
    /// pass-through operations that already hit the network).
    pub fn notify(&self) {
        self.broadcaster.notify_change();
    }

    /// Apply one logical mutation.
    ///
    /// `local` runs synchronously against the store; `remote` is awaited
    /// afterwards. A failed remote write restores the pre-mutation
    /// snapshot bit-for-bit and surfaces `SyncError::RemoteWrite`.
    pub async fn apply<L, Fut>(&self, op: &'static str, local: L, remote: Fut) -> Result<(), SyncError>
    where
        L: FnOnce(&mut BoardStore),
        Fut: Future<Output = anyhow::Result<()>>,
    {
        self.apply_planned(op, move |_: &BoardStore| Ok(Some((local, remote))))
            .await
            .map(|_| ())
    }

    /// Apply one logical mutation whose plan depends on current state.
    ///
    /// `plan` runs against the store only after the write gate is held,
    /// so a gesture issued while another write is outstanding plans
    /// against settled state, never against an optimistic update that
    /// may still roll back. Returning `None` skips the mutation with no
    /// network call. Returns whether a write was issued.
    pub async fn apply_planned<P, L, Fut>(&self, op: &'static str, plan: P) -> Result<bool, SyncError>
    where
        P: FnOnce(&BoardStore) -> Result<Option<(L, Fut)>, SyncError>,
        L: FnOnce(&mut BoardStore),
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let _gate = self.write_gate.lock().await;

        let planned = self.store.read(plan).map_err(|_| SyncError::LockPoisoned)??;
        let Some((local, remote)) = planned else {
            return Ok(false);
        };

        let snapshot = self
            .store
            .read(|s| s.snapshot())
            .map_err(|_| SyncError::LockPoisoned)?;
        self.store.write(local).map_err(|_| SyncError::LockPoisoned)?;

        match remote.await {
            Ok(()) => {
                self.broadcaster.notify_change();
                Ok(true)
            }
            Err(source) => {
                warn!(op, error = %source, "remote write failed, rolling back local state");
                self.store
                    .write(|s| s.restore(snapshot))
                    .map_err(|_| SyncError::LockPoisoned)?;
                Err(SyncError::RemoteWrite { op, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::board::models::{BoardColumn, Job, JobStatus};
    use crate::sync::broadcast::ChangeChannel;

    fn seeded_store() -> (StoreHandle, Job) {
        let job = Job {
            id: Uuid::new_v4(),
            column: BoardColumn::Tuesday,
            sort_key: 10.0,
            title: "replace meter box".into(),
            address: None,
            formatted_address: None,
            coordinates: None,
            paid: false,
            status: JobStatus::Active,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let mut store = BoardStore::new();
        store.replace_all(vec![job.clone()]);
        (StoreHandle::new(store), job)
    }

    fn controller(store: StoreHandle) -> OptimisticController {
        OptimisticController::new(store, ChangeChannel::new().subscribe())
    }

    #[tokio::test]
    async fn test_local_update_applies_before_remote_confirms() {
        let (store, job) = seeded_store();
        let ctl = controller(store.clone());

        ctl.apply(
            "move",
            |s| s.set_column(job.id, BoardColumn::Friday),
            async { Ok(()) },
        )
        .await
        .unwrap();

        let column = store.read(|s| s.get(job.id).unwrap().column).unwrap();
        assert_eq!(column, BoardColumn::Friday);
    }

    #[tokio::test]
    async fn test_failed_remote_write_rolls_back() {
        let (store, job) = seeded_store();
        let ctl = controller(store.clone());
        let before = store.read(|s| s.get(job.id).cloned().unwrap()).unwrap();

        let err = ctl
            .apply(
                "move",
                |s| s.set_column(job.id, BoardColumn::Wednesday),
                async { Err(anyhow::anyhow!("connection reset")) },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::RemoteWrite { op: "move", .. }));
        let after = store.read(|s| s.get(job.id).cloned().unwrap()).unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_plan_waits_for_outstanding_write_to_settle() {
        // A plan built while another write is in flight must wait for
        // the gate and read the settled (here: rolled-back) state, not
        // the optimistic update.
        let (store, job) = seeded_store();
        let ctl = controller(store.clone());
        let seen = std::sync::Mutex::new(None);

        let slow_fail = ctl.apply(
            "move",
            |s| s.set_column(job.id, BoardColumn::Friday),
            async {
                tokio::time::sleep(std::time::Duration::from_millis(80)).await;
                Err(anyhow::anyhow!("gateway timeout"))
            },
        );
        let inspect = async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            ctl.apply_planned("inspect", |s| {
                *seen.lock().unwrap() = s.get(job.id).map(|j| j.column);
                Ok(None::<(fn(&mut BoardStore), std::future::Ready<anyhow::Result<()>>)>)
            })
            .await
        };
        let (first, second) = tokio::join!(slow_fail, inspect);

        assert!(first.is_err());
        assert!(!second.unwrap(), "inspection plan must not issue a write");
        assert_eq!(*seen.lock().unwrap(), Some(BoardColumn::Tuesday));
    }

    #[tokio::test]
    async fn test_success_notifies_sibling_views() {
        let channel = ChangeChannel::new();
        let mut sibling = channel.subscribe();
        let (store, job) = seeded_store();
        let ctl = OptimisticController::new(store, channel.subscribe());

        ctl.apply("edit", |s| s.set_paid(job.id, true), async { Ok(()) })
            .await
            .unwrap();

        let woke = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            sibling.next_remote_change(),
        )
        .await
        .expect("sibling should be notified");
        assert!(woke.is_some());
    }

    #[tokio::test]
    async fn test_failure_does_not_notify() {
        let channel = ChangeChannel::new();
        let mut sibling = channel.subscribe();
        let (store, job) = seeded_store();
        let ctl = OptimisticController::new(store, channel.subscribe());

        let _ = ctl
            .apply("edit", |s| s.set_paid(job.id, true), async {
                Err(anyhow::anyhow!("504"))
            })
            .await;

        let woke = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            sibling.next_remote_change(),
        )
        .await;
        assert!(woke.is_err(), "rolled-back mutations must not broadcast");
    }
}
