//! The pickup queue.
//!
//! Entries are created `waiting` and move to `completed` exactly once. The
//! transition is a conditional update in the store, so of any number of
//! concurrent `complete` calls for one entry only one succeeds.

use std::sync::Arc;

use carline_core::car_number::CarNumber;
use carline_core::error::CoreError;
use carline_core::queue::{clamp_history_limit, NewQueueEntry, QueueEntry, QueueSnapshot};
use carline_core::store::{CompletionOutcome, QueueStore};
use carline_core::types::DbId;
use carline_events::bus::{event_types, DismissalEvent};
use carline_events::EventBus;
use chrono::Utc;

/// Owner of queue entries and the only writer of their status.
#[derive(Clone)]
pub struct QueueEngine {
    store: Arc<dyn QueueStore>,
    events: Arc<EventBus>,
}

impl QueueEngine {
    pub fn new(store: Arc<dyn QueueStore>, events: Arc<EventBus>) -> Self {
        Self { store, events }
    }

    /// Add a waiting entry stamped with the store's clock.
    ///
    /// `student_ids` and `student_names` are a snapshot of the car's riders
    /// and must have the same length. Both may be empty.
    pub async fn enqueue(
        &self,
        car_number: CarNumber,
        student_ids: Vec<DbId>,
        student_names: Vec<String>,
    ) -> Result<QueueEntry, CoreError> {
        let input = NewQueueEntry::new(car_number, student_ids, student_names)?;
        let entry = self.store.insert_entry(&input).await?;

        tracing::info!(
            queue_id = entry.id,
            car_number = car_number.get(),
            student_count = entry.student_ids.len(),
            "Car checked in"
        );
        self.events.publish(
            DismissalEvent::new(event_types::CAR_CHECKED_IN)
                .with_entity(entry.id)
                .with_car(car_number)
                .with_payload(serde_json::json!({
                    "student_names": entry.student_names,
                })),
        );
        Ok(entry)
    }

    /// Waiting entries in pickup order, read straight from the store.
    ///
    /// Ad hoc reads are not part of the published view sequence and carry
    /// version 0.
    pub async fn active_queue(&self) -> Result<QueueSnapshot, CoreError> {
        let entries = self.store.waiting_entries().await?;
        Ok(QueueSnapshot::new(0, Utc::now(), entries))
    }

    /// 1-indexed cone position of a waiting entry. `None` once it has been
    /// completed, or if it never existed.
    pub async fn position_of(&self, queue_id: DbId) -> Result<Option<usize>, CoreError> {
        Ok(self.active_queue().await?.position_of(queue_id))
    }

    /// Mark an entry picked up.
    ///
    /// A repeated call fails with [`CoreError::AlreadyCompleted`] carrying
    /// the first completion time, which is never overwritten.
    pub async fn complete(&self, queue_id: DbId) -> Result<QueueEntry, CoreError> {
        match self.store.complete_entry(queue_id).await? {
            CompletionOutcome::Completed(entry) => {
                tracing::info!(
                    queue_id,
                    car_number = entry.car_number.get(),
                    "Pickup completed"
                );
                self.events.publish(
                    DismissalEvent::new(event_types::PICKUP_COMPLETED)
                        .with_entity(entry.id)
                        .with_car(entry.car_number),
                );
                Ok(entry)
            }
            CompletionOutcome::AlreadyCompleted(entry) => match entry.completed_at {
                Some(completed_at) => {
                    tracing::debug!(queue_id, "Completion repeated");
                    Err(CoreError::AlreadyCompleted {
                        id: queue_id,
                        completed_at,
                    })
                }
                None => Err(CoreError::Internal(format!(
                    "queue entry {queue_id} is neither waiting nor completed"
                ))),
            },
            CompletionOutcome::NotFound => Err(CoreError::NotFound {
                entity: "queue_entry",
                id: queue_id,
            }),
        }
    }

    /// Completed entries, most recent first. `limit` defaults to 50 and is
    /// clamped to `1..=200`.
    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<QueueEntry>, CoreError> {
        self.store
            .completed_entries(clamp_history_limit(limit))
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
