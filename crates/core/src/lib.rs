//! Carline domain core.
//!
//! Pure domain types and rules for the dismissal queue: car numbers,
//! students, queue entries and their ordering, the error taxonomy, and the
//! record-store traits every persistence backend implements. No database or
//! HTTP dependencies live here.

pub mod car_number;
pub mod error;
pub mod queue;
pub mod roster;
pub mod store;
pub mod student;
pub mod types;
