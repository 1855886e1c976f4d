//! Live queue and roster views.
//!
//! Each view is a `tokio::sync::watch` channel holding an `Arc` snapshot.
//! Versions only ever increase, and a watch receiver only ever moves to the
//! newest value, so no observer sees an older snapshot after a newer one.
//! Observers may skip intermediate versions.

use std::sync::Arc;

use carline_core::queue::{QueueEntry, QueueSnapshot};
use carline_core::roster::RosterSnapshot;
use carline_core::student::Student;
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Latest snapshot of each view.
pub struct LiveViews {
    queue: watch::Sender<Arc<QueueSnapshot>>,
    roster: watch::Sender<Arc<RosterSnapshot>>,
}

impl LiveViews {
    /// Start both views at version 0 (empty).
    pub fn new() -> Self {
        let (queue, _) = watch::channel(Arc::new(QueueSnapshot::empty()));
        let (roster, _) = watch::channel(Arc::new(RosterSnapshot::empty()));
        Self { queue, roster }
    }

    pub fn current_queue(&self) -> Arc<QueueSnapshot> {
        Arc::clone(&self.queue.borrow())
    }

    pub fn current_roster(&self) -> Arc<RosterSnapshot> {
        Arc::clone(&self.roster.borrow())
    }

    /// Raw receiver for callers that drive their own loop (WebSocket tasks).
    pub fn watch_queue(&self) -> watch::Receiver<Arc<QueueSnapshot>> {
        self.queue.subscribe()
    }

    pub fn watch_roster(&self) -> watch::Receiver<Arc<RosterSnapshot>> {
        self.roster.subscribe()
    }

    /// Register a queue observer.
    ///
    /// `callback` runs once with the current snapshot, then once per newer
    /// snapshot, until the returned [`Subscription`] is cancelled or dropped.
    pub fn on_queue<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Arc<QueueSnapshot>) + Send + 'static,
    {
        observe(self.queue.subscribe(), callback)
    }

    /// Register a roster observer. Same delivery rules as [`on_queue`](Self::on_queue).
    pub fn on_roster<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Arc<RosterSnapshot>) + Send + 'static,
    {
        observe(self.roster.subscribe(), callback)
    }

    /// Replace the queue view. Returns the new version.
    pub(crate) fn publish_queue(&self, entries: Vec<QueueEntry>) -> u64 {
        let mut version = 0;
        self.queue.send_modify(|current| {
            version = current.version + 1;
            *current = Arc::new(QueueSnapshot::new(version, Utc::now(), entries));
        });
        version
    }

    /// Replace the roster view. Returns the new version.
    pub(crate) fn publish_roster(&self, students: Vec<Student>) -> u64 {
        let mut version = 0;
        self.roster.send_modify(|current| {
            version = current.version + 1;
            *current = Arc::new(RosterSnapshot::new(version, Utc::now(), students));
        });
        version
    }
}

impl Default for LiveViews {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the delivery task for one observer.
fn observe<T, F>(mut rx: watch::Receiver<Arc<T>>, mut callback: F) -> Subscription
where
    T: Send + Sync + 'static,
    F: FnMut(Arc<T>) + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let handle = tokio::spawn(async move {
        let current = Arc::clone(&rx.borrow_and_update());
        callback(current);

        loop {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        // Sender dropped: the views are gone.
                        break;
                    }
                    let snapshot = Arc::clone(&rx.borrow_and_update());
                    callback(snapshot);
                }
            }
        }
    });

    Subscription {
        token,
        handle: Some(handle),
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle to a registered observer. Dropping it cancels delivery.
pub struct Subscription {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop delivery. The callback is not invoked again once the delivery
    /// task observes the cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the delivery task to finish, releasing the
    /// callback and everything it captured.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Subscription task ended abnormally");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
