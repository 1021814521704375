use super::events::{ArbiterEvent, EventReceiver, EventSender, event_bus};
use super::{AckDispatcher, AckOutcome, Alert, AlertMachine, AlertState, Intent};
use crate::config::Config;
use crate::notification::{CallPolicy, Notification, NotificationSource};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;

const EVENT_CAPACITY: usize = 64;

/// How a presented alert was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub alert: Alert,
    pub intent: Intent,
    /// Outcome of the authoritative acknowledgment within the settle window.
    pub ack: AckOutcome,
    /// Set for accepted alerts only.
    pub navigate_to: Option<String>,
}

struct Inner {
    machine: Mutex<AlertMachine>,
    policy: CallPolicy,
    dispatcher: AckDispatcher,
    events: EventSender,
}

impl Inner {
    fn machine(&self) -> MutexGuard<'_, AlertMachine> {
        self.machine
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn publish(&self, event: ArbiterEvent) {
        // No subscribers is fine; the host may not render anything.
        let _ = self.events.send(event);
    }

    fn publish_state(&self, machine: &AlertMachine) {
        self.publish(ArbiterEvent::StateChanged {
            state: machine.state().clone(),
            locked: machine.is_locked(),
        });
    }
}

/// Single serialized entry point to one user's alert lifecycle.
///
/// Selection and every transition run under one lock, so no two of them
/// interleave. Network calls never happen under that lock. Clones share the
/// same machine.
#[derive(Clone)]
pub struct Arbiter {
    inner: Arc<Inner>,
}

impl Arbiter {
    pub fn new(source: Arc<dyn NotificationSource>, config: &Config) -> Self {
        let (events, _) = event_bus(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                machine: Mutex::new(AlertMachine::new()),
                policy: CallPolicy::from_config(&config.calls),
                dispatcher: AckDispatcher::new(source, config.ack.clone()),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.inner.events.subscribe()
    }

    pub fn state(&self) -> AlertState {
        self.inner.machine().state().clone()
    }

    pub fn is_locked(&self) -> bool {
        self.inner.machine().is_locked()
    }

    pub fn has_seen(&self, notification_id: &str) -> bool {
        self.inner.machine().ledger().has_seen(notification_id)
    }

    pub fn seen_count(&self) -> usize {
        self.inner.machine().ledger().len()
    }

    /// Feed a poll snapshot to the engine.
    ///
    /// Presents at most one alert. The optimistic acknowledgment is spawned in
    /// the same critical section that records the id, so it is never issued
    /// after the presentation. Outside a Tokio runtime nothing is presented
    /// and the snapshot is left for the next poll.
    pub fn observe(&self, batch: &[Notification]) -> Option<Alert> {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("Notification snapshot ignored: no Tokio runtime to acknowledge on");
            return None;
        };

        let mut machine = self.inner.machine();
        let alert = machine.offer(batch, &self.inner.policy)?;

        tracing::info!(
            "Presenting incoming call {} ({})",
            alert.notification_id,
            alert.target
        );
        self.inner
            .dispatcher
            .fire_optimistic(&runtime, alert.notification_id.clone());
        self.inner.publish_state(&machine);
        Some(alert)
    }

    pub async fn accept(&self, notification_id: &str) -> Option<Resolution> {
        self.resolve(notification_id, Intent::Accept).await
    }

    pub async fn decline(&self, notification_id: &str) -> Option<Resolution> {
        self.resolve(notification_id, Intent::Decline).await
    }

    /// Resolve the presented alert. Returns `None` without side effects when
    /// `notification_id` is not presented or a resolution is already running.
    ///
    /// The return to idle happens in a detached task, so dropping this future
    /// cannot leave the machine stuck in resolving.
    async fn resolve(&self, notification_id: &str, intent: Intent) -> Option<Resolution> {
        let alert = {
            let mut machine = self.inner.machine();
            let Some(alert) = machine.begin_resolution(notification_id, intent) else {
                tracing::debug!(
                    "Ignoring {intent} for {notification_id}: not presented or already resolving"
                );
                return None;
            };
            self.inner.publish_state(&machine);
            alert
        };
        tracing::info!("Resolving incoming call {} ({intent})", alert.notification_id);

        let ack = self
            .inner
            .dispatcher
            .fire_authoritative(alert.notification_id.clone());
        let inner = Arc::clone(&self.inner);
        let completion = tokio::spawn(async move {
            let ack = inner.dispatcher.settle(ack).await;

            let navigate_to = (intent == Intent::Accept).then(|| alert.target.clone());
            {
                // Navigate goes out under the same lock as the idle transition,
                // so no newer alert can be presented in between.
                let mut machine = inner.machine();
                machine.finish_resolution();
                inner.publish_state(&machine);
                if let Some(target) = &navigate_to {
                    inner.publish(ArbiterEvent::Navigate {
                        target: target.clone(),
                    });
                }
            }
            tracing::info!("Incoming call {} resolved ({intent})", alert.notification_id);

            Resolution {
                alert,
                intent,
                ack,
                navigate_to,
            }
        });

        match completion.await {
            Ok(resolution) => Some(resolution),
            Err(e) => {
                tracing::error!("Alert resolution task failed: {e}");
                None
            }
        }
    }
}
