use super::source::{NotificationSource, SourceFuture};
use super::Notification;
use crate::error::SourceError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct MemoryFeed {
    notifications: Vec<Notification>,
    mark_read_calls: Vec<String>,
    poll_failures: VecDeque<String>,
    ack_failures: usize,
    ack_delay: Option<Duration>,
}

/// In-process notification feed.
///
/// Cloning shares the underlying feed, so a test or embedding host can keep a
/// handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    feed: Arc<Mutex<MemoryFeed>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        let source = Self::new();
        source.replace(notifications);
        source
    }

    fn feed(&self) -> MutexGuard<'_, MemoryFeed> {
        self.feed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Replace the whole feed, as a server-side refresh would.
    pub fn replace(&self, notifications: Vec<Notification>) {
        self.feed().notifications = notifications;
    }

    pub fn push(&self, notification: Notification) {
        self.feed().notifications.push(notification);
    }

    /// Append an unread incoming call with a fresh id and return that id.
    pub fn ring(&self, target: impl Into<String>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.push(Notification::incoming_call(id.clone(), target));
        id
    }

    /// Every id passed to `mark_read`, in call order (including failed calls).
    pub fn mark_read_calls(&self) -> Vec<String> {
        self.feed().mark_read_calls.clone()
    }

    pub fn mark_read_count(&self, notification_id: &str) -> usize {
        self.feed()
            .mark_read_calls
            .iter()
            .filter(|id| id.as_str() == notification_id)
            .count()
    }

    pub fn is_read(&self, notification_id: &str) -> Option<bool> {
        self.feed()
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .map(|n| n.is_read)
    }

    /// Make the next poll fail with `SourceUnavailable`.
    pub fn fail_next_poll(&self, message: impl Into<String>) {
        self.feed().poll_failures.push_back(message.into());
    }

    /// Make the next `count` mark-read calls fail.
    pub fn fail_next_acks(&self, count: usize) {
        self.feed().ack_failures = count;
    }

    /// Delay every mark-read call, simulating a slow store.
    pub fn set_ack_delay(&self, delay: Option<Duration>) {
        self.feed().ack_delay = delay;
    }
}

impl NotificationSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_notifications<'a>(&'a self, _user_id: &'a str) -> SourceFuture<'a, Vec<Notification>> {
        Box::pin(async move {
            let mut feed = self.feed();
            if let Some(message) = feed.poll_failures.pop_front() {
                return Err(SourceError::Unavailable(message));
            }
            Ok(feed.notifications.clone())
        })
    }

    fn mark_read<'a>(&'a self, notification_id: &'a str) -> SourceFuture<'a, ()> {
        Box::pin(async move {
            let delay = {
                let mut feed = self.feed();
                feed.mark_read_calls.push(notification_id.to_string());
                feed.ack_delay
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut feed = self.feed();
            if feed.ack_failures > 0 {
                feed.ack_failures -= 1;
                return Err(SourceError::AcknowledgeFailed {
                    id: notification_id.to_string(),
                    message: "injected failure".into(),
                });
            }
            let notification = feed
                .notifications
                .iter_mut()
                .find(|n| n.id == notification_id)
                .ok_or_else(|| SourceError::NotFound(notification_id.to_string()))?;
            notification.is_read = true;
            Ok(())
        })
    }
}
