use super::AlertState;
use tokio::sync::broadcast;

/// What the host UI needs to render the alert and follow an accepted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArbiterEvent {
    /// Emitted on every transition. `locked` mirrors the session lock; the UI
    /// disables its accept/decline controls while it is set.
    StateChanged { state: AlertState, locked: bool },
    /// Emitted once per accepted alert, after the return to idle.
    Navigate { target: String },
}

pub type EventSender = broadcast::Sender<ArbiterEvent>;
pub type EventReceiver = broadcast::Receiver<ArbiterEvent>;

/// Create a broadcast event bus with the given capacity.
pub fn event_bus(capacity: usize) -> (EventSender, EventReceiver) {
    broadcast::channel(capacity)
}
