//! Live WebSocket round trip: a real server on an ephemeral port, a
//! `tokio-tungstenite` client, and the view refresher running.

mod common;

use std::time::Duration;

use carline_api::background::BackgroundTasks;
use carline_api::router::build_app_router;
use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Next JSON text frame, skipping pings.
async fn next_json(client: &mut Client) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(WAIT, client.next())
            .await
            .expect("frame should arrive")
            .expect("stream open")
            .expect("valid frame");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn console_receives_snapshots_and_events() {
    let (state, _store) = common::test_state();
    let background = BackgroundTasks::start(&state);
    let app = build_app_router(state.clone(), &common::test_config());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/ws"))
        .await
        .unwrap();

    let first = next_json(&mut client).await;
    assert_eq!(first["type"], "queue");
    let second = next_json(&mut client).await;
    assert_eq!(second["type"], "roster");

    state.roster.register("Ana", "Diaz", 7).await.unwrap();
    let entry = state.checkin.check_in(7, false).await.unwrap();

    let mut saw_event = false;
    let mut saw_car = false;
    let mut queue_versions = vec![first["version"].as_u64().unwrap()];
    while !(saw_event && saw_car) {
        let frame = next_json(&mut client).await;
        match frame["type"].as_str() {
            Some("event") if frame["event"]["event_type"] == "queue.checked_in" => {
                assert_eq!(frame["event"]["entity_id"], entry.id);
                saw_event = true;
            }
            Some("queue") => {
                queue_versions.push(frame["version"].as_u64().unwrap());
                let entries = frame["entries"].as_array().unwrap();
                if entries.len() == 1 {
                    assert_eq!(entries[0]["id"], entry.id);
                    assert_eq!(entries[0]["position"], 1);
                    assert_eq!(entries[0]["student_names"][0], "Ana Diaz");
                    saw_car = true;
                }
            }
            _ => {}
        }
    }
    assert!(queue_versions.windows(2).all(|w| w[0] < w[1]), "{queue_versions:?}");

    assert_eq!(state.ws_manager.connection_count().await, 1);
    state.ws_manager.shutdown_all().await;
    background.shutdown(WAIT).await;
}
