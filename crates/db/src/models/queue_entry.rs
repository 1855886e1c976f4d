//! Row model for the `queue_entries` table.

use carline_core::car_number::CarNumber;
use carline_core::error::CoreError;
use carline_core::queue::{QueueEntry, QueueStatus, StatusId};
use carline_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `queue_entries` table.
#[derive(Debug, Clone, FromRow)]
pub struct QueueEntryRow {
    pub id: DbId,
    pub car_number: i32,
    pub student_ids: Vec<DbId>,
    pub student_names: Vec<String>,
    pub created_at: Timestamp,
    pub status_id: StatusId,
    pub completed_at: Option<Timestamp>,
}

impl TryFrom<QueueEntryRow> for QueueEntry {
    type Error = CoreError;

    fn try_from(row: QueueEntryRow) -> Result<Self, Self::Error> {
        let car_number = CarNumber::new(row.car_number.into()).map_err(|_| {
            CoreError::Internal(format!(
                "Queue entry {} has invalid car number {}",
                row.id, row.car_number
            ))
        })?;
        let entry = QueueEntry {
            id: row.id,
            car_number,
            student_ids: row.student_ids,
            student_names: row.student_names,
            created_at: row.created_at,
            status: QueueStatus::from_id(row.status_id)?,
            completed_at: row.completed_at,
        };
        entry.check_consistency()?;
        Ok(entry)
    }
}

/// Convert a batch of rows, failing on the first inconsistent one.
pub fn into_entries(rows: Vec<QueueEntryRow>) -> Result<Vec<QueueEntry>, CoreError> {
    rows.into_iter().map(QueueEntry::try_from).collect()
}
