use std::sync::Arc;

use carline_core::store::DismissalStore;
use carline_events::{EventBus, LiveViews};
use carline_pickup::{CheckInCoordinator, QueueEngine, Roster};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is itself a handle.
#[derive(Clone)]
pub struct AppState {
    /// Backing record store (PostgreSQL or in-memory).
    pub store: Arc<dyn DismissalStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    pub roster: Roster,
    pub queue: QueueEngine,
    pub checkin: CheckInCoordinator,
    /// Live queue and roster snapshots, written by the view refresher.
    pub views: Arc<LiveViews>,
    /// WebSocket connection manager.
    pub ws_manager: Arc<WsManager>,
    /// Domain events published by the services.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Wire the services around `store`.
    pub fn new<S>(store: Arc<S>, config: ServerConfig) -> Self
    where
        S: DismissalStore + 'static,
    {
        let event_bus = Arc::new(EventBus::default());
        let roster = Roster::new(store.clone(), Arc::clone(&event_bus));
        let queue = QueueEngine::new(store.clone(), Arc::clone(&event_bus));
        let checkin = CheckInCoordinator::new(roster.clone(), queue.clone());

        Self {
            store,
            config: Arc::new(config),
            roster,
            queue,
            checkin,
            views: Arc::new(LiveViews::new()),
            ws_manager: Arc::new(WsManager::new()),
            event_bus,
        }
    }
}
