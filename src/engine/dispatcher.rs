use crate::config::AckConfig;
use crate::diagnostics::health;
use crate::notification::NotificationSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Which of the two mark-read calls of an alert lifecycle this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AckPhase {
    /// Issued when the alert is presented; nobody waits for it.
    Optimistic,
    /// Issued when the user resolves the alert; waited on for a bounded time.
    Authoritative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Acknowledged,
    Failed(String),
    /// Still in flight when the settle window closed. The task keeps running.
    Pending,
}

/// Performs mark-read calls against the notification source as detached
/// tasks. Failures are logged and recorded in the health registry, never
/// returned to the state machine.
#[derive(Clone)]
pub struct AckDispatcher {
    source: Arc<dyn NotificationSource>,
    config: AckConfig,
}

impl AckDispatcher {
    pub fn new(source: Arc<dyn NotificationSource>, config: AckConfig) -> Self {
        Self { source, config }
    }

    /// Spawn a single-attempt acknowledgment on `runtime` and forget about it.
    pub fn fire_optimistic(
        &self,
        runtime: &Handle,
        notification_id: String,
    ) -> JoinHandle<AckOutcome> {
        let source = Arc::clone(&self.source);
        runtime.spawn(async move {
            acknowledge(
                source.as_ref(),
                &notification_id,
                AckPhase::Optimistic,
                1,
                Duration::ZERO,
            )
            .await
        })
    }

    /// Spawn the acknowledgment issued at resolution, retried with doubling
    /// backoff up to `max_attempts`.
    pub fn fire_authoritative(&self, notification_id: String) -> JoinHandle<AckOutcome> {
        let source = Arc::clone(&self.source);
        let attempts = self.config.max_attempts.max(1);
        let backoff = self.config.retry_backoff();
        tokio::spawn(async move {
            acknowledge(
                source.as_ref(),
                &notification_id,
                AckPhase::Authoritative,
                attempts,
                backoff,
            )
            .await
        })
    }

    /// Wait at most the configured settle timeout for `handle`.
    pub async fn settle(&self, handle: JoinHandle<AckOutcome>) -> AckOutcome {
        match tokio::time::timeout(self.config.settle_timeout(), handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::error!("Acknowledgment task aborted: {e}");
                AckOutcome::Failed(e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    "Acknowledgment still pending after {}ms; continuing without it",
                    self.config.settle_timeout_ms
                );
                AckOutcome::Pending
            }
        }
    }
}

async fn acknowledge(
    source: &dyn NotificationSource,
    notification_id: &str,
    phase: AckPhase,
    max_attempts: u32,
    initial_backoff: Duration,
) -> AckOutcome {
    let mut backoff = initial_backoff;
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        match source.mark_read(notification_id).await {
            Ok(()) => {
                tracing::debug!("{phase} acknowledgment of {notification_id} succeeded");
                health::mark_component_ok("ack");
                return AckOutcome::Acknowledged;
            }
            Err(e) => {
                tracing::warn!(
                    "{phase} acknowledgment of {notification_id} failed (attempt {attempt}/{max_attempts}): {e}"
                );
                health::mark_component_error("ack", &e);
                if attempt >= max_attempts || !e.is_retryable() {
                    return AckOutcome::Failed(e.to_string());
                }
            }
        }
        tokio::time::sleep(backoff).await;
        backoff = backoff.saturating_mul(2);
    }
}
