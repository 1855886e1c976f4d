//! Row types for the carline tables.
//!
//! Rows mirror column types exactly; conversion into the domain types in
//! `carline_core` re-checks every invariant the schema also enforces.

pub mod queue_entry;
pub mod student;
