//! In-process [`DismissalStore`] for tests and demo mode.
//!
//! All state sits behind one async mutex. Critical sections contain no
//! await points, so a cancelled caller either finished its write or never
//! started it. Change notices are sent while the lock is held, which keeps
//! the feed in commit order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use carline_core::car_number::CarNumber;
use carline_core::error::CoreError;
use carline_core::queue::{NewQueueEntry, QueueEntry, QueueStatus};
use carline_core::roster::roster_order;
use carline_core::store::{
    Collection, CompletionOutcome, DismissalStore, QueueStore, RosterStore, StoreChange,
};
use carline_core::student::{NewStudent, Student};
use carline_core::types::{DbId, Timestamp};
use chrono::Utc;
use tokio::sync::{broadcast, Mutex, MutexGuard};

/// Buffer capacity of the change feed.
const CHANGE_FEED_CAPACITY: usize = 256;

#[derive(Default)]
struct State {
    last_student_id: DbId,
    last_entry_id: DbId,
    last_created_at: Option<Timestamp>,
    students: Vec<Student>,
    entries: BTreeMap<DbId, QueueEntry>,
}

impl State {
    fn push_student(&mut self, input: &NewStudent, created_at: Timestamp) -> Student {
        self.last_student_id += 1;
        let student = Student {
            id: self.last_student_id,
            first_name: input.first_name().to_string(),
            last_name: input.last_name().to_string(),
            car_number: input.car_number(),
            created_at,
        };
        self.students.push(student.clone());
        student
    }

    /// Wall-clock now, clamped so creation times never go backwards.
    fn next_created_at(&mut self) -> Timestamp {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }
}

/// Memory-resident store. Cheap to construct; one per test.
pub struct MemoryStore {
    state: Mutex<State>,
    changes: broadcast::Sender<StoreChange>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            state: Mutex::new(State::default()),
            changes,
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate an outage: while offline every call fails with
    /// `StoreUnavailable` and nothing is written.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        tracing::debug!(offline, "Memory store availability changed");
    }

    async fn lock(&self) -> Result<MutexGuard<'_, State>, CoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoreError::StoreUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(self.state.lock().await)
    }

    fn notify(&self, collection: Collection) {
        let _ = self.changes.send(StoreChange { collection });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn insert_student(&self, input: &NewStudent) -> Result<Student, CoreError> {
        let mut state = self.lock().await?;
        let student = state.push_student(input, Utc::now());
        self.notify(Collection::Students);
        Ok(student)
    }

    async fn insert_students(&self, inputs: &[NewStudent]) -> Result<Vec<Student>, CoreError> {
        let mut state = self.lock().await?;
        let now = Utc::now();
        let students = inputs
            .iter()
            .map(|input| state.push_student(input, now))
            .collect();
        self.notify(Collection::Students);
        Ok(students)
    }

    async fn list_students(&self) -> Result<Vec<Student>, CoreError> {
        let state = self.lock().await?;
        let mut students = state.students.clone();
        students.sort_by(roster_order);
        Ok(students)
    }

    async fn students_by_car(&self, car_number: CarNumber) -> Result<Vec<Student>, CoreError> {
        let state = self.lock().await?;
        let mut students: Vec<Student> = state
            .students
            .iter()
            .filter(|s| s.car_number == car_number)
            .cloned()
            .collect();
        students.sort_by(roster_order);
        Ok(students)
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn insert_entry(&self, input: &NewQueueEntry) -> Result<QueueEntry, CoreError> {
        let mut state = self.lock().await?;
        state.last_entry_id += 1;
        let entry = QueueEntry {
            id: state.last_entry_id,
            car_number: input.car_number(),
            student_ids: input.student_ids().to_vec(),
            student_names: input.student_names().to_vec(),
            created_at: state.next_created_at(),
            status: QueueStatus::Waiting,
            completed_at: None,
        };
        state.entries.insert(entry.id, entry.clone());
        self.notify(Collection::QueueEntries);
        Ok(entry)
    }

    async fn find_entry(&self, id: DbId) -> Result<Option<QueueEntry>, CoreError> {
        let state = self.lock().await?;
        Ok(state.entries.get(&id).cloned())
    }

    async fn complete_entry(&self, id: DbId) -> Result<CompletionOutcome, CoreError> {
        let mut state = self.lock().await?;
        let Some(entry) = state.entries.get_mut(&id) else {
            return Ok(CompletionOutcome::NotFound);
        };
        if !entry.is_waiting() {
            return Ok(CompletionOutcome::AlreadyCompleted(entry.clone()));
        }
        entry.status = QueueStatus::Completed;
        entry.completed_at = Some(Utc::now().max(entry.created_at));
        let completed = entry.clone();
        self.notify(Collection::QueueEntries);
        Ok(CompletionOutcome::Completed(completed))
    }

    async fn waiting_entries(&self) -> Result<Vec<QueueEntry>, CoreError> {
        let state = self.lock().await?;
        let mut entries: Vec<QueueEntry> = state
            .entries
            .values()
            .filter(|e| e.is_waiting())
            .cloned()
            .collect();
        entries.sort_by(QueueEntry::queue_order);
        Ok(entries)
    }

    async fn completed_entries(&self, limit: i64) -> Result<Vec<QueueEntry>, CoreError> {
        let state = self.lock().await?;
        let mut entries: Vec<QueueEntry> = state
            .entries
            .values()
            .filter(|e| !e.is_waiting())
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));
        entries.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(entries)
    }
}

#[async_trait]
impl DismissalStore for MemoryStore {
    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.lock().await.map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
