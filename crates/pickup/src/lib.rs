//! Dismissal services.
//!
//! - [`Roster`] registers and looks up students.
//! - [`QueueEngine`] owns the pickup queue and its one-way
//!   `waiting -> completed` transition.
//! - [`CheckInCoordinator`] turns a typed or scanned car number into a
//!   roster lookup followed by a queue insertion.
//!
//! Services talk to the store only through the `carline_core::store` traits
//! and publish a [`DismissalEvent`](carline_events::DismissalEvent) after
//! every successful write.

pub mod checkin;
pub mod queue;
pub mod roster;

pub use checkin::{CheckInCoordinator, ScanPreview};
pub use queue::QueueEngine;
pub use roster::Roster;
