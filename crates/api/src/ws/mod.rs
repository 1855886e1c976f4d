//! WebSocket push for operator consoles.
//!
//! Connection tracking, keep-alive pings, the push frame format and the
//! upgrade handler mounted at `/api/v1/ws`.

mod handler;
mod heartbeat;
pub mod manager;
pub mod push;

pub use handler::ws_handler;
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use manager::WsManager;
pub use push::PushMessage;
