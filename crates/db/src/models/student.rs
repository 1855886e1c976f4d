//! Row model for the `students` table.

use carline_core::car_number::CarNumber;
use carline_core::error::CoreError;
use carline_core::student::Student;
use carline_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub car_number: i32,
    pub created_at: Timestamp,
}

impl TryFrom<StudentRow> for Student {
    type Error = CoreError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let car_number = CarNumber::new(row.car_number.into()).map_err(|_| {
            CoreError::Internal(format!(
                "Student {} has invalid car number {}",
                row.id, row.car_number
            ))
        })?;
        Ok(Student {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            car_number,
            created_at: row.created_at,
        })
    }
}
