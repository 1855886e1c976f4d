//! Keeps [`LiveViews`] in step with the store.
//!
//! [`ViewRefresher`] consumes the store's change feed and re-reads the
//! affected view after each committed write. It is the only writer of the
//! views and runs its queries one at a time, so published versions follow
//! the order of the reads.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use carline_core::error::CoreError;
use carline_core::store::{Collection, DismissalStore, StoreChange};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::live::LiveViews;

/// Retry budget for view reads.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    /// Total attempts per refresh, including the first.
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `backoff * n` before the next try.
    pub backoff: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(200),
        }
    }
}

/// Which views a batch of change notices touched.
#[derive(Debug, Default, Clone, Copy)]
struct Dirty {
    queue: bool,
    roster: bool,
}

impl Dirty {
    fn all() -> Self {
        Self {
            queue: true,
            roster: true,
        }
    }

    fn mark(&mut self, change: StoreChange) {
        match change.collection {
            Collection::QueueEntries => self.queue = true,
            Collection::Students => self.roster = true,
        }
    }
}

/// Background task that republishes views when the store changes.
pub struct ViewRefresher {
    store: Arc<dyn DismissalStore>,
    views: Arc<LiveViews>,
    policy: RefreshPolicy,
    cancel: CancellationToken,
}

impl ViewRefresher {
    pub fn new(
        store: Arc<dyn DismissalStore>,
        views: Arc<LiveViews>,
        policy: RefreshPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            views,
            policy,
            cancel,
        }
    }

    /// Subscribe to the store's feed and run on a new task.
    ///
    /// The subscription is taken before the initial read, so no write that
    /// commits after `spawn` returns can be missed.
    pub fn spawn(self) -> JoinHandle<()> {
        let changes = self.store.subscribe_changes();
        tokio::spawn(self.run(changes))
    }

    /// Publish both views, then refresh on every change notice until the
    /// feed closes or the token is cancelled.
    pub async fn run(self, mut changes: broadcast::Receiver<StoreChange>) {
        self.refresh(Dirty::all()).await;

        loop {
            let received = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    tracing::info!("View refresher cancelled");
                    break;
                }
                received = changes.recv() => received,
            };

            let mut dirty = Dirty::default();
            let mut closed = false;
            match received {
                Ok(change) => dirty.mark(change),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "View refresher lagged, refreshing all views");
                    dirty = Dirty::all();
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Store change feed closed, view refresher shutting down");
                    break;
                }
            }

            // Fold everything already queued into one round of reads.
            loop {
                match changes.try_recv() {
                    Ok(change) => dirty.mark(change),
                    Err(TryRecvError::Lagged(_)) => dirty = Dirty::all(),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Closed) => {
                        closed = true;
                        break;
                    }
                }
            }

            self.refresh(dirty).await;
            if closed {
                tracing::info!("Store change feed closed, view refresher shutting down");
                break;
            }
        }
    }

    async fn refresh(&self, dirty: Dirty) {
        if dirty.queue {
            let store = &self.store;
            if let Some(entries) = self.with_retry("queue", || store.waiting_entries()).await {
                let version = self.views.publish_queue(entries);
                tracing::debug!(version, "Queue view refreshed");
            }
        }
        if dirty.roster {
            let store = &self.store;
            if let Some(students) = self.with_retry("roster", || store.list_students()).await {
                let version = self.views.publish_roster(students);
                tracing::debug!(version, "Roster view refreshed");
            }
        }
    }

    /// Run a read, retrying `StoreUnavailable` with linear backoff.
    ///
    /// Returns `None` when the budget runs out, the error is not retryable,
    /// or the refresher is cancelled mid-wait. The previous snapshot then
    /// stays published.
    async fn with_retry<T, F, Fut>(&self, view: &'static str, mut read: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match read().await {
                Ok(value) => return Some(value),
                Err(CoreError::StoreUnavailable(msg)) if attempt < max_attempts => {
                    tracing::warn!(view, attempt, error = %msg, "View read failed, retrying");
                    let delay = self.policy.backoff * attempt;
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return None,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => {
                    tracing::error!(view, attempt, error = %e, "View read failed, keeping last snapshot");
                    return None;
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
