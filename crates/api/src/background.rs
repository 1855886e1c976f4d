//! Long-running tasks started alongside the HTTP server.
//!
//! Every task observes one [`CancellationToken`] so shutdown can stop them
//! together.

use std::sync::Arc;
use std::time::Duration;

use carline_events::ViewRefresher;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use crate::ws;

/// Handles to the running background tasks.
pub struct BackgroundTasks {
    cancel: CancellationToken,
    refresher: JoinHandle<()>,
    heartbeat: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Start the view refresher and the WebSocket heartbeat.
    pub fn start(state: &AppState) -> Self {
        let cancel = CancellationToken::new();

        let refresher = ViewRefresher::new(
            Arc::clone(&state.store),
            Arc::clone(&state.views),
            state.config.refresh_policy(),
            cancel.clone(),
        )
        .spawn();
        tracing::info!("View refresher started");

        let heartbeat = ws::start_heartbeat(
            Arc::clone(&state.ws_manager),
            ws::HEARTBEAT_INTERVAL,
            cancel.clone(),
        );

        Self {
            cancel,
            refresher,
            heartbeat,
        }
    }

    /// Cancel every task and wait up to `timeout` for them to stop.
    pub async fn shutdown(self, timeout: Duration) {
        let Self {
            cancel,
            refresher,
            heartbeat,
        } = self;
        cancel.cancel();
        let stopped = tokio::time::timeout(timeout, async move {
            let _ = refresher.await;
            let _ = heartbeat.await;
        })
        .await;
        if stopped.is_err() {
            tracing::warn!("Background tasks did not stop in time");
        } else {
            tracing::info!("Background tasks stopped");
        }
    }
}
