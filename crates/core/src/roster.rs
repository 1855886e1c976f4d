//! Roster ordering, name search, and the demo seed.

use std::cmp::Ordering;

use serde::Serialize;

use crate::student::{CreateStudent, Student};
use crate::types::Timestamp;

/// Directory order: last name, then first name, then id.
pub fn roster_order(a: &Student, b: &Student) -> Ordering {
    a.last_name
        .cmp(&b.last_name)
        .then_with(|| a.first_name.cmp(&b.first_name))
        .then(a.id.cmp(&b.id))
}

/// Case-insensitive substring match on first or last name.
///
/// A blank query matches every student.
pub fn matches_name(student: &Student, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    student.first_name.to_lowercase().contains(&needle)
        || student.last_name.to_lowercase().contains(&needle)
}

/// Filter an already-ordered roster by name, preserving its order.
pub fn search(students: &[Student], query: &str) -> Vec<Student> {
    students
        .iter()
        .filter(|s| matches_name(s, query))
        .cloned()
        .collect()
}

/// Point-in-time view of the whole roster in directory order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterSnapshot {
    /// Increases by one with every published snapshot.
    pub version: u64,
    pub taken_at: Timestamp,
    pub students: Vec<Student>,
}

impl RosterSnapshot {
    pub fn new(version: u64, taken_at: Timestamp, mut students: Vec<Student>) -> Self {
        students.sort_by(roster_order);
        Self {
            version,
            taken_at,
            students,
        }
    }

    /// The version-0 snapshot published before the first refresh.
    pub fn empty() -> Self {
        Self::new(0, chrono::Utc::now(), Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Demo seed
// ---------------------------------------------------------------------------

const DEMO_FIRST_NAMES: [&str; 10] = [
    "Alice", "Bob", "Carlos", "Dana", "Eli", "Fatima", "George", "Hannah", "Ian", "Julia",
];

const DEMO_LAST_NAMES: [&str; 10] = [
    "Anderson", "Brown", "Chen", "Diaz", "Evans", "Foster", "Green", "Hughes", "Ingram", "Jones",
];

/// Number of students in the demo roster.
pub const DEMO_ROSTER_SIZE: usize = 30;

/// The demo roster: two students per car, cars `1..=15`.
pub fn demo_roster() -> Vec<CreateStudent> {
    (0..DEMO_ROSTER_SIZE)
        .map(|i| {
            CreateStudent::new(
                DEMO_FIRST_NAMES[i % DEMO_FIRST_NAMES.len()],
                DEMO_LAST_NAMES[(i / 3) % DEMO_LAST_NAMES.len()],
                (i / 2 + 1) as i64,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
