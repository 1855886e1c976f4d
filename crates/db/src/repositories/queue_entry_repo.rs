//! Repository for the `queue_entries` table.
//!
//! Status literals always go through `QueueStatus::id()`.

use carline_core::queue::{NewQueueEntry, QueueStatus};
use carline_core::types::DbId;
use sqlx::PgPool;

use crate::models::queue_entry::QueueEntryRow;

/// Column list for `queue_entries` queries.
const COLUMNS: &str = "\
    id, car_number, student_ids, student_names, \
    created_at, status_id, completed_at";

/// Provides insert, lookup, and completion operations for queue entries.
pub struct QueueEntryRepo;

impl QueueEntryRepo {
    /// Insert a waiting entry. `created_at` comes from the server clock.
    pub async fn create(pool: &PgPool, input: &NewQueueEntry) -> Result<QueueEntryRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO queue_entries (car_number, student_ids, student_names, status_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueEntryRow>(&query)
            .bind(input.car_number().get())
            .bind(input.student_ids())
            .bind(input.student_names())
            .bind(QueueStatus::Waiting.id())
            .fetch_one(pool)
            .await
    }

    /// Find an entry by id regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QueueEntryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM queue_entries WHERE id = $1");
        sqlx::query_as::<_, QueueEntryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Complete an entry only if it is still waiting.
    ///
    /// Returns `None` when the row is missing or already completed. The
    /// `status_id` predicate is re-checked after any concurrent update
    /// commits, so two racing callers never both get a row back.
    pub async fn complete_if_waiting(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<QueueEntryRow>, sqlx::Error> {
        let query = format!(
            "UPDATE queue_entries \
             SET status_id = $2, completed_at = clock_timestamp() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueEntryRow>(&query)
            .bind(id)
            .bind(QueueStatus::Completed.id())
            .bind(QueueStatus::Waiting.id())
            .fetch_optional(pool)
            .await
    }

    /// Waiting entries in pickup order.
    pub async fn list_waiting(pool: &PgPool) -> Result<Vec<QueueEntryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_entries \
             WHERE status_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, QueueEntryRow>(&query)
            .bind(QueueStatus::Waiting.id())
            .fetch_all(pool)
            .await
    }

    /// Completed entries, most recent pickup first.
    pub async fn list_completed(pool: &PgPool, limit: i64) -> Result<Vec<QueueEntryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_entries \
             WHERE status_id = $1 \
             ORDER BY completed_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, QueueEntryRow>(&query)
            .bind(QueueStatus::Completed.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
