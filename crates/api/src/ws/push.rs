//! JSON text frames pushed to consoles.
//!
//! Every frame carries a `type` tag: `queue`, `roster`, or `event`.

use axum::extract::ws::Message;
use carline_core::queue::{PositionedEntry, QueueSnapshot};
use carline_core::roster::RosterSnapshot;
use carline_core::student::Student;
use carline_core::types::Timestamp;
use carline_events::DismissalEvent;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    /// Active queue with cone positions.
    Queue {
        version: u64,
        taken_at: Timestamp,
        entries: Vec<PositionedEntry>,
    },
    Roster {
        version: u64,
        taken_at: Timestamp,
        students: Vec<Student>,
    },
    Event { event: DismissalEvent },
}

impl PushMessage {
    pub fn queue(snapshot: &QueueSnapshot) -> Self {
        PushMessage::Queue {
            version: snapshot.version,
            taken_at: snapshot.taken_at,
            entries: snapshot.positioned(),
        }
    }

    pub fn roster(snapshot: &RosterSnapshot) -> Self {
        PushMessage::Roster {
            version: snapshot.version,
            taken_at: snapshot.taken_at,
            students: snapshot.students.clone(),
        }
    }

    /// Encode as a text frame. `None` (logged) if serialization fails.
    pub fn to_frame(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(Message::Text(text.into())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode push message");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use carline_events::bus::event_types;

    use super::*;

    fn decode(message: &PushMessage) -> serde_json::Value {
        match message.to_frame() {
            Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[test]
    fn queue_frame_is_tagged_and_positioned() {
        let json = decode(&PushMessage::queue(&QueueSnapshot::empty()));
        assert_eq!(json["type"], "queue");
        assert_eq!(json["version"], 0);
        assert!(json["entries"].as_array().unwrap().is_empty());
    }

    #[test]
    fn event_frame_nests_the_event() {
        let event = DismissalEvent::new(event_types::PICKUP_COMPLETED).with_entity(3);
        let json = decode(&PushMessage::Event { event });
        assert_eq!(json["type"], "event");
        assert_eq!(json["event"]["event_type"], "queue.completed");
        assert_eq!(json["event"]["entity_id"], 3);
    }
}
