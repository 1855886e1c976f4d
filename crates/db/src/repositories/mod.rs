//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return raw rows.

pub mod queue_entry_repo;
pub mod student_repo;

pub use queue_entry_repo::QueueEntryRepo;
pub use student_repo::StudentRepo;
