use super::{Alert, AlertState, Arbiter};
use crate::config::Config;
use crate::diagnostics::health;
use crate::error::SourceError;
use crate::notification::NotificationSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Drives an [`Arbiter`] from a notification source on a fixed interval.
pub struct Poller {
    arbiter: Arbiter,
    source: Arc<dyn NotificationSource>,
    user_id: String,
    interval: Duration,
    ring_timeout: Option<Duration>,
}

impl Poller {
    pub fn new(arbiter: Arbiter, source: Arc<dyn NotificationSource>, config: &Config) -> Self {
        Self {
            arbiter,
            source,
            user_id: config.user_id.clone(),
            interval: config.poll.interval(),
            ring_timeout: config.poll.ring_timeout(),
        }
    }

    /// Fetch one snapshot and hand it to the arbiter.
    ///
    /// The fetch happens outside the arbiter's critical section.
    pub async fn poll_once(&self) -> Result<Option<Alert>, SourceError> {
        let batch = self.source.list_notifications(&self.user_id).await?;
        Ok(self.arbiter.observe(&batch))
    }

    /// Poll until `cancel` fires. A failed poll skips the cycle and keeps the
    /// current state.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            "Polling {} source for user {} every {}s",
            self.source.name(),
            self.user_id,
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Poller stopped");
                    return;
                }
                _ = interval.tick() => {}
            }

            self.enforce_ring_timeout();

            match self.poll_once().await {
                Ok(_) => health::mark_component_ok("poller"),
                Err(e) => {
                    tracing::warn!("Notification poll failed, retrying next cycle: {e}");
                    health::mark_component_error("poller", &e);
                }
            }
        }
    }

    /// Decline the presented alert once it has rung longer than the timeout.
    /// Runs detached so the bounded ack wait never delays the next poll.
    fn enforce_ring_timeout(&self) {
        let Some(timeout) = self.ring_timeout else {
            return;
        };
        let AlertState::Presenting(alert) = self.arbiter.state() else {
            return;
        };
        if alert.presented_instant.elapsed() < timeout {
            return;
        }

        tracing::info!(
            "Incoming call {} unanswered after {}s; declining",
            alert.notification_id,
            timeout.as_secs()
        );
        let arbiter = self.arbiter.clone();
        tokio::spawn(async move {
            arbiter.decline(&alert.notification_id).await;
        });
    }
}
