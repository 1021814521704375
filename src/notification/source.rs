use super::Notification;
use crate::error::SourceError;
use std::future::Future;
use std::pin::Pin;

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Feed of notifications for a user, owned by some external store.
///
/// The engine only consumes snapshots. Implementations may be polled
/// concurrently by unrelated parts of the host.
pub trait NotificationSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Current notifications for `user_id`, in feed (priority) order.
    fn list_notifications<'a>(&'a self, user_id: &'a str) -> SourceFuture<'a, Vec<Notification>>;

    /// Mark a notification as read. Marking an already-read id must succeed
    /// without further side effects.
    fn mark_read<'a>(&'a self, notification_id: &'a str) -> SourceFuture<'a, ()>;
}
