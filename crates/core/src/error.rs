use crate::car_number::CarNumber;
use crate::types::{DbId, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Queue entry {id} was already completed at {completed_at}")]
    AlreadyCompleted { id: DbId, completed_at: Timestamp },

    #[error("No students registered for car {car_number}")]
    NoStudentsFound { car_number: CarNumber },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
