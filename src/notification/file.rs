use super::source::{NotificationSource, SourceFuture};
use super::{FeedPayload, Notification};
use crate::error::SourceError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Notification feed backed by a JSON snapshot file.
///
/// The feed file has a single writer outside the engine and is only ever
/// read here, so every poll sees what that writer last produced. Read state
/// is appended to a sidecar file (`<feed>.read`, one id per line) and laid
/// over each snapshot.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    read_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut read_path = path.clone().into_os_string();
        read_path.push(".read");
        Self {
            path,
            read_path: read_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar holding the ids marked read by this engine.
    pub fn read_path(&self) -> &Path {
        &self.read_path
    }

    async fn read_payload(&self) -> Result<FeedPayload, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&contents).map_err(|e| SourceError::Decode(e.to_string()))
    }

    async fn read_ids(&self) -> Result<HashSet<String>, SourceError> {
        match tokio::fs::read_to_string(&self.read_path).await {
            Ok(contents) => Ok(contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
            Err(e) => Err(SourceError::Unavailable(format!(
                "{}: {e}",
                self.read_path.display()
            ))),
        }
    }

    async fn append_read_id(&self, notification_id: &str) -> Result<(), SourceError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.read_path)
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        file.write_all(format!("{notification_id}\n").as_bytes())
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))
    }
}

impl NotificationSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn list_notifications<'a>(&'a self, _user_id: &'a str) -> SourceFuture<'a, Vec<Notification>> {
        Box::pin(async move {
            let payload = match self.read_payload().await {
                Ok(payload) => payload,
                Err(SourceError::Decode(e)) => {
                    return Err(SourceError::Unavailable(format!("undecodable feed: {e}")));
                }
                Err(e) => return Err(e),
            };
            let read = self.read_ids().await?;
            Ok(payload
                .notifications
                .into_iter()
                .map(|mut n| {
                    n.is_read |= read.contains(&n.id);
                    n
                })
                .collect())
        })
    }

    fn mark_read<'a>(&'a self, notification_id: &'a str) -> SourceFuture<'a, ()> {
        Box::pin(async move {
            let ack_failed = |e: SourceError| SourceError::AcknowledgeFailed {
                id: notification_id.to_string(),
                message: e.to_string(),
            };
            let _guard = self.write_lock.lock().await;
            let payload = self.read_payload().await.map_err(ack_failed)?;

            let notification = payload
                .notifications
                .iter()
                .find(|n| n.id == notification_id)
                .ok_or_else(|| SourceError::NotFound(notification_id.to_string()))?;
            if notification.is_read {
                return Ok(());
            }
            let already_read = self.read_ids().await.map_err(ack_failed)?;
            if already_read.contains(notification_id) {
                return Ok(());
            }

            self.append_read_id(notification_id).await.map_err(ack_failed)
        })
    }
}
