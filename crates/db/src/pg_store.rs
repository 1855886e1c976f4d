//! PostgreSQL-backed [`DismissalStore`].
//!
//! Writes go through the repositories. The change feed is fed exclusively by
//! `LISTEN carline_changes`, so writes from other server processes reach
//! local subscribers the same way local writes do.

use std::time::Duration;

use async_trait::async_trait;
use carline_core::car_number::CarNumber;
use carline_core::error::CoreError;
use carline_core::queue::{NewQueueEntry, QueueEntry};
use carline_core::store::{
    Collection, CompletionOutcome, DismissalStore, QueueStore, RosterStore, StoreChange,
};
use carline_core::student::{NewStudent, Student};
use carline_core::types::DbId;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::store_error;
use crate::models::queue_entry::into_entries;
use crate::repositories::{QueueEntryRepo, StudentRepo};
use crate::DbPool;

/// Notification channel written by the `notify_carline_change` trigger.
pub const CHANGE_CHANNEL: &str = "carline_changes";

/// Buffer capacity of the local change feed.
const CHANGE_FEED_CAPACITY: usize = 256;

/// Pause before retrying after the listener connection drops.
const LISTENER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Store backed by a PostgreSQL pool.
pub struct PgStore {
    pool: DbPool,
    changes: broadcast::Sender<StoreChange>,
    listener: JoinHandle<()>,
}

impl PgStore {
    /// Wrap a migrated pool and start the change listener.
    ///
    /// Fails if the `LISTEN` connection cannot be established.
    pub async fn connect(pool: DbPool) -> Result<Self, CoreError> {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await.map_err(store_error)?;
        listener.listen(CHANGE_CHANNEL).await.map_err(store_error)?;
        tracing::info!(channel = CHANGE_CHANNEL, "Listening for store changes");

        let listener = tokio::spawn(run_listener(listener, changes.clone()));

        Ok(Self {
            pool,
            changes,
            listener,
        })
    }
}

impl Drop for PgStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Forward notifications to the local feed until the task is aborted.
///
/// `try_recv` reports a dropped connection as `Ok(None)` and reconnects on
/// the next call. Notifications sent while disconnected are lost, so every
/// reconnect is followed by a change notice for each collection.
async fn run_listener(mut listener: PgListener, changes: broadcast::Sender<StoreChange>) {
    loop {
        match listener.try_recv().await {
            Ok(Some(notification)) => match Collection::parse(notification.payload()) {
                Some(collection) => {
                    let _ = changes.send(StoreChange { collection });
                }
                None => {
                    tracing::warn!(payload = notification.payload(), "Unknown change payload");
                }
            },
            Ok(None) => {
                tracing::warn!("Change listener connection lost, resubscribing");
                resync(&changes);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Change listener error, retrying");
                tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                resync(&changes);
            }
        }
    }
}

fn resync(changes: &broadcast::Sender<StoreChange>) {
    for collection in [Collection::Students, Collection::QueueEntries] {
        let _ = changes.send(StoreChange { collection });
    }
}

#[async_trait]
impl RosterStore for PgStore {
    async fn insert_student(&self, input: &NewStudent) -> Result<Student, CoreError> {
        let row = StudentRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?;
        Student::try_from(row)
    }

    async fn insert_students(&self, inputs: &[NewStudent]) -> Result<Vec<Student>, CoreError> {
        let rows = StudentRepo::create_many(&self.pool, inputs)
            .await
            .map_err(store_error)?;
        rows.into_iter().map(Student::try_from).collect()
    }

    async fn list_students(&self) -> Result<Vec<Student>, CoreError> {
        let rows = StudentRepo::list(&self.pool).await.map_err(store_error)?;
        rows.into_iter().map(Student::try_from).collect()
    }

    async fn students_by_car(&self, car_number: CarNumber) -> Result<Vec<Student>, CoreError> {
        let rows = StudentRepo::list_by_car(&self.pool, car_number.get())
            .await
            .map_err(store_error)?;
        rows.into_iter().map(Student::try_from).collect()
    }
}

#[async_trait]
impl QueueStore for PgStore {
    async fn insert_entry(&self, input: &NewQueueEntry) -> Result<QueueEntry, CoreError> {
        let row = QueueEntryRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?;
        QueueEntry::try_from(row)
    }

    async fn find_entry(&self, id: DbId) -> Result<Option<QueueEntry>, CoreError> {
        QueueEntryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(QueueEntry::try_from)
            .transpose()
    }

    async fn complete_entry(&self, id: DbId) -> Result<CompletionOutcome, CoreError> {
        if let Some(row) = QueueEntryRepo::complete_if_waiting(&self.pool, id)
            .await
            .map_err(store_error)?
        {
            return Ok(CompletionOutcome::Completed(QueueEntry::try_from(row)?));
        }

        // Nothing updated: tell "already done" apart from "never existed".
        Ok(match self.find_entry(id).await? {
            Some(entry) => CompletionOutcome::AlreadyCompleted(entry),
            None => CompletionOutcome::NotFound,
        })
    }

    async fn waiting_entries(&self) -> Result<Vec<QueueEntry>, CoreError> {
        let rows = QueueEntryRepo::list_waiting(&self.pool)
            .await
            .map_err(store_error)?;
        into_entries(rows)
    }

    async fn completed_entries(&self, limit: i64) -> Result<Vec<QueueEntry>, CoreError> {
        let rows = QueueEntryRepo::list_completed(&self.pool, limit)
            .await
            .map_err(store_error)?;
        into_entries(rows)
    }
}

#[async_trait]
impl DismissalStore for PgStore {
    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}
