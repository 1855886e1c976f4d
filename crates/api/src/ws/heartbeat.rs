//! Keep-alive pings for console sockets. Idle consoles get a ping every
//! [`HEARTBEAT_INTERVAL`].

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every open console each `every` until `cancel` fires.
///
/// The first ping goes out one full interval after start.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + every;
        let mut ticks = tokio::time::interval_at(start, every);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticks.tick() => {}
            }

            let consoles = ws_manager.connection_count().await;
            if consoles > 0 {
                tracing::trace!(consoles, "Pinging consoles");
                ws_manager.ping_all().await;
            }
        }
        tracing::debug!("Heartbeat stopped");
    })
}
