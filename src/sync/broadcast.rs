//! Cross-client change signal.
//!
//! A single timestamp slot shared by every view of the same operator
//! (tabs/windows); any write means "state may be stale, refetch
//! everything". There is no diffing and no merge. Changes made by other
//! operators entirely are caught by a foreground-only periodic poll,
//! which also backstops any notification lost to write races.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::debug;

/// The shared timestamp slot. One channel per browser-profile analogue;
/// every view subscribes its own broadcaster to it.
#[derive(Clone)]
pub struct ChangeChannel {
    tx: watch::Sender<i64>,
}

impl ChangeChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Attach a view to the channel.
    pub fn subscribe(&self) -> ChangeBroadcaster {
        ChangeBroadcaster {
            tx: self.tx.clone(),
            rx: self.tx.subscribe(),
            own_last: Arc::new(AtomicI64::new(0)),
            visible: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl Default for ChangeChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// One view's handle on the change channel: writes notifications after
/// successful mutations and listens for notifications from sibling
/// views, ignoring its own.
pub struct ChangeBroadcaster {
    tx: watch::Sender<i64>,
    rx: watch::Receiver<i64>,
    own_last: Arc<AtomicI64>,
    visible: Arc<AtomicBool>,
}

impl ChangeBroadcaster {
    /// Write the current timestamp to the slot. The value is kept
    /// strictly increasing so repeated writes in the same millisecond
    /// still register as changes.
    pub fn notify_change(&self) {
        let current = *self.tx.borrow();
        let stamp = Utc::now().timestamp_millis().max(current + 1);
        // Record our own stamp before publishing so the listener task
        // never races a fresh notification against a stale own_last.
        self.own_last.store(stamp, Ordering::SeqCst);
        self.tx.send_replace(stamp);
    }

    /// Wait for the next notification written by a sibling view.
    /// Returns `None` once the channel is closed.
    pub async fn next_remote_change(&mut self) -> Option<i64> {
        loop {
            self.rx.changed().await.ok()?;
            let value = *self.rx.borrow_and_update();
            if value != self.own_last.load(Ordering::SeqCst) {
                return Some(value);
            }
        }
    }

    /// Spawn a listener invoking `callback` on every sibling
    /// notification. The task ends when the channel closes.
    pub fn spawn_on_remote_change<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listener = ChangeBroadcaster {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            own_last: self.own_last.clone(),
            visible: self.visible.clone(),
        };
        tokio::spawn(async move {
            while let Some(stamp) = listener.next_remote_change().await {
                debug!(stamp, "sibling view changed shared state, reloading");
                callback();
            }
        })
    }

    /// Spawn the periodic poll fallback. Fires `callback` every
    /// `interval` while the view is marked visible; ticks in the
    /// background are skipped, not queued.
    pub fn spawn_poll<F>(&self, interval: Duration, callback: F) -> JoinHandle<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let visible = self.visible.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if visible.load(Ordering::SeqCst) {
                    callback();
                }
            }
        })
    }

    /// Mark the view foreground-visible or not. Only visible views poll.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}
