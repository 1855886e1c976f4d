pub mod checkins;
pub mod queue;
pub mod students;
