//! Record-store traits.
//!
//! The dismissal engine depends on a persistent, queryable, subscribable
//! store and nothing else. Implementations live in `carline-db`
//! (PostgreSQL and in-memory); the services in `carline-pickup` and the
//! live-view refresher in `carline-events` only see these traits.
//!
//! Every method is a single atomic operation: a dropped future either
//! committed its write completely or not at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::car_number::CarNumber;
use crate::error::CoreError;
use crate::queue::{NewQueueEntry, QueueEntry};
use crate::student::{NewStudent, Student};
use crate::types::DbId;

/// A collection whose contents changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Students,
    QueueEntries,
}

impl Collection {
    /// Table name, also used as the notification payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::QueueEntries => "queue_entries",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "students" => Some(Collection::Students),
            "queue_entries" => Some(Collection::QueueEntries),
            _ => None,
        }
    }
}

/// Change notice pushed on the store's feed after a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub collection: Collection,
}

/// Result of a conditional `waiting -> completed` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// This call performed the transition.
    Completed(QueueEntry),
    /// The entry was completed earlier; its stored state is returned unchanged.
    AlreadyCompleted(QueueEntry),
    NotFound,
}

#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn insert_student(&self, input: &NewStudent) -> Result<Student, CoreError>;

    /// Insert a batch atomically: all rows or none.
    async fn insert_students(&self, inputs: &[NewStudent]) -> Result<Vec<Student>, CoreError>;

    /// All students ordered by last name, first name, id.
    async fn list_students(&self) -> Result<Vec<Student>, CoreError>;

    /// Students riding in `car_number`, in the same order as `list_students`.
    async fn students_by_car(&self, car_number: CarNumber) -> Result<Vec<Student>, CoreError>;
}

#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert a `waiting` entry stamped with the store's clock.
    async fn insert_entry(&self, input: &NewQueueEntry) -> Result<QueueEntry, CoreError>;

    async fn find_entry(&self, id: DbId) -> Result<Option<QueueEntry>, CoreError>;

    /// Complete `id` if and only if it is currently waiting.
    async fn complete_entry(&self, id: DbId) -> Result<CompletionOutcome, CoreError>;

    /// Waiting entries ordered by `(created_at, id)`.
    async fn waiting_entries(&self) -> Result<Vec<QueueEntry>, CoreError>;

    /// Completed entries, most recently completed first.
    async fn completed_entries(&self, limit: i64) -> Result<Vec<QueueEntry>, CoreError>;
}

/// A full backend: both collections plus a change feed.
#[async_trait]
pub trait DismissalStore: RosterStore + QueueStore {
    /// Receive a [`StoreChange`] for every committed write, including writes
    /// made by other processes sharing the same database.
    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_round_trip() {
        for collection in [Collection::Students, Collection::QueueEntries] {
            assert_eq!(Collection::parse(collection.as_str()), Some(collection));
        }
        assert_eq!(Collection::parse("staff"), None);
    }
}
