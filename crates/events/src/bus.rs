//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DismissalEvent`]s. It is
//! shared via `Arc<EventBus>` between the services that publish after a
//! successful write and the WebSocket layer that forwards events to
//! operator consoles.

use carline_core::car_number::CarNumber;
use carline_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event type names.
pub mod event_types {
    pub const STUDENT_REGISTERED: &str = "student.registered";
    pub const ROSTER_SEEDED: &str = "roster.seeded";
    pub const CAR_CHECKED_IN: &str = "queue.checked_in";
    pub const PICKUP_COMPLETED: &str = "queue.completed";
}

// ---------------------------------------------------------------------------
// DismissalEvent
// ---------------------------------------------------------------------------

/// Something that happened at the pickup line.
///
/// Constructed via [`DismissalEvent::new`] and enriched with
/// [`with_entity`](DismissalEvent::with_entity),
/// [`with_car`](DismissalEvent::with_car), and
/// [`with_payload`](DismissalEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissalEvent {
    /// Dot-separated event name, e.g. `"queue.checked_in"`.
    pub event_type: String,

    /// Id of the student or queue entry the event is about.
    pub entity_id: Option<DbId>,

    /// Car involved, when there is one.
    pub car_number: Option<CarNumber>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: Timestamp,
}

impl DismissalEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entity_id: None,
            car_number: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_entity(mut self, id: DbId) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn with_car(mut self, car_number: CarNumber) -> Self {
        self.car_number = Some(car_number);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use carline_events::bus::{event_types, DismissalEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DismissalEvent::new(event_types::CAR_CHECKED_IN));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DismissalEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is silently dropped.
    pub fn publish(&self, event: DismissalEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DismissalEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DismissalEvent::new(event_types::CAR_CHECKED_IN)
            .with_entity(42)
            .with_car(CarNumber::new(7).unwrap())
            .with_payload(serde_json::json!({"student_count": 2}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "queue.checked_in");
        assert_eq!(received.entity_id, Some(42));
        assert_eq!(received.car_number.map(CarNumber::get), Some(7));
        assert_eq!(received.payload["student_count"], 2);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DismissalEvent::new(event_types::PICKUP_COMPLETED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "queue.completed");
        assert_eq!(e2.event_type, "queue.completed");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DismissalEvent::new(event_types::ROSTER_SEEDED));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = DismissalEvent::new("bare.event");
        assert!(event.entity_id.is_none());
        assert!(event.car_number.is_none());
        assert!(event.payload.is_object());
    }
}
