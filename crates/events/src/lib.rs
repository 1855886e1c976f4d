//! Carline push infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub for [`DismissalEvent`]s,
//!   backed by `tokio::sync::broadcast`.
//! - [`LiveViews`]: versioned queue and roster snapshots on
//!   `tokio::sync::watch` channels, with cancellable [`Subscription`]s.
//! - [`ViewRefresher`]: the single writer of [`LiveViews`]; re-queries the
//!   store whenever its change feed reports a write.

pub mod bus;
pub mod live;
pub mod refresher;

pub use bus::{DismissalEvent, EventBus};
pub use live::{LiveViews, Subscription};
pub use refresher::{RefreshPolicy, ViewRefresher};
