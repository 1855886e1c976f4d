use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use carline_core::queue::QueueSnapshot;
use carline_core::roster::RosterSnapshot;
use carline_events::DismissalEvent;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};

use crate::state::AppState;
use crate::ws::push::PushMessage;

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Everything one connection reads from.
struct Feeds {
    control: mpsc::UnboundedReceiver<Message>,
    queue: watch::Receiver<Arc<QueueSnapshot>>,
    roster: watch::Receiver<Arc<RosterSnapshot>>,
    events: broadcast::Receiver<DismissalEvent>,
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` and subscribes to the
///      live views and the event bus.
///   2. Spawns a sender task that pushes the current snapshots, then every
///      newer snapshot, event, and control frame.
///   3. Processes inbound messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let feeds = Feeds {
        control: state.ws_manager.add(conn_id.clone()).await,
        queue: state.views.watch_queue(),
        roster: state.views.watch_roster(),
        events: state.event_bus.subscribe(),
    };

    let (sink, mut stream) = socket.split();
    let send_task = tokio::spawn(push_loop(sink, feeds, conn_id.clone()));

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {
                // Consoles are read-only over the socket; writes go through HTTP.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    let open_for = state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(
        conn_id = %conn_id,
        open_secs = open_for.map(|d| d.num_seconds()),
        "WebSocket disconnected"
    );
}

/// Forward snapshots, events, and control frames to the sink.
///
/// Each watch receiver only moves forward, so this connection never sees
/// an older snapshot after a newer one.
async fn push_loop(mut sink: SplitSink<WebSocket, Message>, mut feeds: Feeds, conn_id: String) {
    let initial = [queue_message(&mut feeds.queue), roster_message(&mut feeds.roster)];
    for message in initial {
        if send(&mut sink, &message).await.is_err() {
            return;
        }
    }

    loop {
        let message = tokio::select! {
            control = feeds.control.recv() => {
                let Some(frame) = control else { break };
                let closing = matches!(frame, Message::Close(_));
                if sink.send(frame).await.is_err() || closing {
                    break;
                }
                continue;
            }
            changed = feeds.queue.changed() => {
                if changed.is_err() {
                    break;
                }
                queue_message(&mut feeds.queue)
            }
            changed = feeds.roster.changed() => {
                if changed.is_err() {
                    break;
                }
                roster_message(&mut feeds.roster)
            }
            event = feeds.events.recv() => match event {
                Ok(event) => PushMessage::Event { event },
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(conn_id = %conn_id, skipped = n, "WebSocket event feed lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };

        if send(&mut sink, &message).await.is_err() {
            tracing::debug!(conn_id = %conn_id, "WebSocket sink closed");
            break;
        }
    }
}

fn queue_message(rx: &mut watch::Receiver<Arc<QueueSnapshot>>) -> PushMessage {
    let snapshot = Arc::clone(&rx.borrow_and_update());
    PushMessage::queue(&snapshot)
}

fn roster_message(rx: &mut watch::Receiver<Arc<RosterSnapshot>>) -> PushMessage {
    let snapshot = Arc::clone(&rx.borrow_and_update());
    PushMessage::roster(&snapshot)
}

async fn send(
    sink: &mut SplitSink<WebSocket, Message>,
    message: &PushMessage,
) -> Result<(), axum::Error> {
    match message.to_frame() {
        Some(frame) => sink.send(frame).await,
        None => Ok(()),
    }
}
