//! Check-in: car number in, queue entry out.
//!
//! The operator flow is confirm-then-commit. [`CheckInCoordinator::preview`]
//! (or [`resolve_scan`](CheckInCoordinator::resolve_scan) for scanned codes)
//! shows who rides in the car; [`check_in`](CheckInCoordinator::check_in)
//! commits. A car with no registered students is rejected unless the
//! operator explicitly overrides with `allow_empty`.

use carline_core::car_number::CarNumber;
use carline_core::error::CoreError;
use carline_core::queue::QueueEntry;
use carline_core::student::Student;
use carline_core::types::DbId;
use serde::Serialize;

use crate::queue::QueueEngine;
use crate::roster::Roster;

/// Result of resolving a scanned code, handed back to the scanner so it can
/// confirm before checking in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanPreview {
    pub car_number: CarNumber,
    pub students: Vec<Student>,
}

#[derive(Clone)]
pub struct CheckInCoordinator {
    roster: Roster,
    queue: QueueEngine,
}

impl CheckInCoordinator {
    pub fn new(roster: Roster, queue: QueueEngine) -> Self {
        Self { roster, queue }
    }

    /// Students who would be checked in with `car_number`. No side effects.
    pub async fn preview(&self, car_number: i64) -> Result<Vec<Student>, CoreError> {
        self.roster.find_by_car_number(car_number).await
    }

    /// Check a car in.
    ///
    /// Fails with [`CoreError::NoStudentsFound`] and writes nothing when the
    /// car has no registered students, unless `allow_empty` is set.
    pub async fn check_in(&self, car_number: i64, allow_empty: bool) -> Result<QueueEntry, CoreError> {
        let car_number = CarNumber::new(car_number)?;
        self.check_in_car(car_number, allow_empty).await
    }

    /// Check in from typed text. Non-digit characters are discarded first.
    pub async fn check_in_text(&self, raw: &str, allow_empty: bool) -> Result<QueueEntry, CoreError> {
        let car_number = CarNumber::parse_typed(raw)?;
        self.check_in_car(car_number, allow_empty).await
    }

    /// Turn a scanned code into a car number and its riders. Nothing is
    /// written; the caller follows up with [`check_in`](Self::check_in).
    pub async fn resolve_scan(&self, code: &str) -> Result<ScanPreview, CoreError> {
        let car_number = CarNumber::extract_from_scan(code)?;
        let students = self.roster.students_in(car_number).await?;
        tracing::debug!(
            car_number = car_number.get(),
            student_count = students.len(),
            "Scan resolved"
        );
        Ok(ScanPreview {
            car_number,
            students,
        })
    }

    async fn check_in_car(&self, car_number: CarNumber, allow_empty: bool) -> Result<QueueEntry, CoreError> {
        let students = self.roster.students_in(car_number).await?;
        if students.is_empty() && !allow_empty {
            tracing::info!(car_number = car_number.get(), "Check-in rejected, no students");
            return Err(CoreError::NoStudentsFound { car_number });
        }

        let (ids, names): (Vec<DbId>, Vec<String>) = students
            .iter()
            .map(|s| (s.id, s.display_name()))
            .unzip();
        self.queue.enqueue(car_number, ids, names).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use carline_db::MemoryStore;
    use carline_events::bus::event_types;
    use carline_events::EventBus;

    use super::*;

    struct Harness {
        roster: Roster,
        queue: QueueEngine,
        coordinator: CheckInCoordinator,
        store: Arc<MemoryStore>,
        events: Arc<EventBus>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let events = Arc::new(EventBus::default());
        let roster = Roster::new(store.clone(), Arc::clone(&events));
        let queue = QueueEngine::new(store.clone(), Arc::clone(&events));
        let coordinator = CheckInCoordinator::new(roster.clone(), queue.clone());
        Harness {
            roster,
            queue,
            coordinator,
            store,
            events,
        }
    }

    #[tokio::test]
    async fn preview_then_check_in_snapshots_riders() {
        let h = harness();
        h.roster.register("Ana", "Diaz", 20).await.unwrap();
        h.roster.register("Ben", "Diaz", 20).await.unwrap();

        assert_eq!(h.coordinator.preview(20).await.unwrap().len(), 2);

        let entry = h.coordinator.check_in(20, false).await.unwrap();
        assert_eq!(entry.student_ids.len(), 2);
        assert_eq!(entry.student_names, vec!["Ana Diaz", "Ben Diaz"]);

        let snapshot = h.queue.active_queue().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.position_of(entry.id), Some(1));
    }

    #[tokio::test]
    async fn preview_of_impossible_car_is_empty() {
        let h = harness();
        assert!(h.coordinator.preview(0).await.unwrap().is_empty());
        assert!(h.coordinator.preview(i64::from(i32::MAX) + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_car_needs_override() {
        let h = harness();
        assert_matches!(
            h.coordinator.check_in(99, false).await,
            Err(CoreError::NoStudentsFound { car_number }) if car_number.get() == 99
        );
        assert!(h.queue.active_queue().await.unwrap().is_empty());

        let entry = h.coordinator.check_in(99, true).await.unwrap();
        assert!(entry.student_ids.is_empty());
        assert!(entry.student_names.is_empty());
        assert_eq!(h.queue.active_queue().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_car_number_writes_nothing() {
        let h = harness();
        assert_matches!(h.coordinator.check_in(0, true).await, Err(CoreError::InvalidInput(_)));
        assert_matches!(h.coordinator.check_in(-3, true).await, Err(CoreError::InvalidInput(_)));
        assert_matches!(
            h.coordinator.check_in(i64::from(i32::MAX) + 1, true).await,
            Err(CoreError::InvalidInput(_))
        );
        assert!(h.queue.active_queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn names_are_a_snapshot_at_check_in_time() {
        let h = harness();
        h.roster.register("Ana", "Diaz", 4).await.unwrap();
        let entry = h.coordinator.check_in(4, false).await.unwrap();

        h.roster.register("Ben", "Diaz", 4).await.unwrap();
        let snapshot = h.queue.active_queue().await.unwrap();
        assert_eq!(snapshot.entries[0].id, entry.id);
        assert_eq!(snapshot.entries[0].student_names, vec!["Ana Diaz"]);
    }

    #[tokio::test]
    async fn duplicate_check_ins_are_independent_entries() {
        let h = harness();
        h.roster.register("Ana", "Diaz", 4).await.unwrap();
        let a = h.coordinator.check_in(4, false).await.unwrap();
        let b = h.coordinator.check_in(4, false).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(h.queue.active_queue().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn typed_text_is_stripped_to_digits() {
        let h = harness();
        h.roster.register("Ana", "Diaz", 20).await.unwrap();
        let entry = h.coordinator.check_in_text(" #2 0 ", false).await.unwrap();
        assert_eq!(entry.car_number.get(), 20);

        assert_matches!(
            h.coordinator.check_in_text("abc", true).await,
            Err(CoreError::InvalidInput(_))
        );
    }

    #[tokio::test]
    async fn scan_resolves_without_writing() {
        let h = harness();
        h.roster.register("Ana", "Diaz", 42).await.unwrap();

        let preview = h.coordinator.resolve_scan("CAR-0042").await.unwrap();
        assert_eq!(preview.car_number.get(), 42);
        assert_eq!(preview.students.len(), 1);
        assert!(h.queue.active_queue().await.unwrap().is_empty());

        assert_matches!(
            h.coordinator.resolve_scan("no digits here").await,
            Err(CoreError::InvalidInput(_))
        );
    }

    #[tokio::test]
    async fn check_in_publishes_event() {
        let h = harness();
        let mut rx = h.events.subscribe();
        let entry = h.coordinator.check_in(12, true).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, event_types::CAR_CHECKED_IN);
        assert_eq!(event.entity_id, Some(entry.id));
        assert_eq!(event.car_number.map(CarNumber::get), Some(12));
    }

    #[tokio::test]
    async fn outage_fails_check_in_without_partial_entry() {
        let h = harness();
        h.roster.register("Ana", "Diaz", 4).await.unwrap();
        h.store.set_offline(true);
        assert_matches!(
            h.coordinator.check_in(4, false).await,
            Err(CoreError::StoreUnavailable(_))
        );
        h.store.set_offline(false);
        assert!(h.queue.active_queue().await.unwrap().is_empty());
    }
}
