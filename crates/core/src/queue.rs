//! Queue entries, their status lifecycle, and pickup ordering.
//!
//! Entries are ordered by `(created_at, id)`. The id is assigned by the store
//! in call order, so it breaks ties between entries that share a timestamp.
//! Positions are derived on read and never stored.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::car_number::CarNumber;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Lifecycle of a queue entry. Discriminants match the seed rows of the
/// `queue_entry_statuses` lookup table.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Waiting = 1,
    Completed = 2,
}

impl QueueStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
        match id {
            1 => Ok(Self::Waiting),
            2 => Ok(Self::Completed),
            other => Err(CoreError::Internal(format!(
                "Unknown queue status id {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// QueueEntry
// ---------------------------------------------------------------------------

/// A car checked in for pickup.
///
/// `student_ids` and `student_names` are a snapshot taken at check-in and
/// are never re-joined against the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: DbId,
    pub car_number: CarNumber,
    pub student_ids: Vec<DbId>,
    pub student_names: Vec<String>,
    pub created_at: Timestamp,
    pub status: QueueStatus,
    pub completed_at: Option<Timestamp>,
}

impl QueueEntry {
    pub fn is_waiting(&self) -> bool {
        self.status == QueueStatus::Waiting
    }

    /// Check the `status == completed <=> completed_at is set` invariant.
    ///
    /// Stores call this when materializing rows so a corrupt record surfaces
    /// as an error instead of a silently misplaced car.
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        match (self.status, self.completed_at) {
            (QueueStatus::Waiting, None) | (QueueStatus::Completed, Some(_)) => Ok(()),
            (status, completed_at) => Err(CoreError::Internal(format!(
                "Queue entry {} has status {status:?} with completed_at {completed_at:?}",
                self.id
            ))),
        }
    }

    /// Pickup order: earliest `created_at` first, then lowest id.
    pub fn queue_order(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then(self.id.cmp(&other.id))
    }
}

/// Identity snapshot for a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueueEntry {
    car_number: CarNumber,
    student_ids: Vec<DbId>,
    student_names: Vec<String>,
}

impl NewQueueEntry {
    /// Build a snapshot from explicit ids and names.
    ///
    /// Both lists may be empty (a deliberate "check in anyway"), but they
    /// must describe the same students.
    pub fn new(
        car_number: CarNumber,
        student_ids: Vec<DbId>,
        student_names: Vec<String>,
    ) -> Result<Self, CoreError> {
        if student_ids.len() != student_names.len() {
            return Err(CoreError::InvalidInput(format!(
                "Got {} student ids but {} student names",
                student_ids.len(),
                student_names.len()
            )));
        }
        Ok(Self {
            car_number,
            student_ids,
            student_names,
        })
    }

    pub fn car_number(&self) -> CarNumber {
        self.car_number
    }

    pub fn student_ids(&self) -> &[DbId] {
        &self.student_ids
    }

    pub fn student_names(&self) -> &[String] {
        &self.student_names
    }
}

// ---------------------------------------------------------------------------
// Snapshots and positions
// ---------------------------------------------------------------------------

/// A waiting entry together with its 1-indexed cone position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedEntry {
    pub position: usize,
    #[serde(flatten)]
    pub entry: QueueEntry,
}

/// Point-in-time view of the active queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    /// Increases by one with every published snapshot.
    pub version: u64,
    pub taken_at: Timestamp,
    pub entries: Vec<QueueEntry>,
}

impl QueueSnapshot {
    /// Build a snapshot, keeping only waiting entries in pickup order.
    pub fn new(version: u64, taken_at: Timestamp, mut entries: Vec<QueueEntry>) -> Self {
        entries.retain(QueueEntry::is_waiting);
        entries.sort_by(QueueEntry::queue_order);
        Self {
            version,
            taken_at,
            entries,
        }
    }

    /// The version-0 snapshot published before the first refresh.
    pub fn empty() -> Self {
        Self::new(0, chrono::Utc::now(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-indexed position of `id`, if it is waiting.
    pub fn position_of(&self, id: DbId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .map(|index| index + 1)
    }

    /// Entries paired with their positions, front of the line first.
    pub fn positioned(&self) -> Vec<PositionedEntry> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| PositionedEntry {
                position: index + 1,
                entry: entry.clone(),
            })
            .collect()
    }
}

/// Default history page size.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Upper bound for a history page.
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// Clamp an optional history limit into `1..=MAX_HISTORY_LIMIT`.
pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
