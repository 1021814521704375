use crate::config::CallsConfig;
use crate::error::NotificationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a notification as reported by the feed's `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    IncomingCall,
    Appointment,
    Note,
    Survey,
    General,
    Other(String),
}

impl From<String> for NotificationKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "call" | "incoming-call" => Self::IncomingCall,
            "appointment" => Self::Appointment,
            "note" => Self::Note,
            "survey" => Self::Survey,
            "general" => Self::General,
            _ => Self::Other(raw),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IncomingCall => "call",
            Self::Appointment => "appointment",
            Self::Note => "note",
            Self::Survey => "survey",
            Self::General => "general",
            Self::Other(raw) => raw,
        };
        f.write_str(name)
    }
}

/// One entry of the user's notification feed.
///
/// Owned by the external source; the engine only ever reads snapshots of it.
/// `id` is stable across polls for the same logical event and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// Resource locator the user is taken to on acceptance.
    #[serde(rename = "link", default)]
    pub target: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(id: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: String::new(),
            message: String::new(),
            target: None,
            is_read: false,
            created_at: None,
        }
    }

    /// Unread incoming call pointing at `target`.
    pub fn incoming_call(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            title: "Incoming Call".into(),
            target: Some(target.into()),
            created_at: Some(Utc::now()),
            ..Self::new(id, NotificationKind::IncomingCall)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn read(mut self) -> Self {
        self.is_read = true;
        self
    }
}

/// Payload of the notification list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPayload {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub unread_count: u32,
}

impl FeedPayload {
    pub fn new(notifications: Vec<Notification>) -> Self {
        let unread = notifications.iter().filter(|n| !n.is_read).count();
        Self {
            notifications,
            unread_count: u32::try_from(unread).unwrap_or(u32::MAX),
        }
    }
}

/// Decides which notifications count as incoming calls and which call
/// targets are well-formed.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    target_prefixes: Vec<String>,
    legacy_titles: Vec<String>,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::from_config(&CallsConfig::default())
    }
}

impl CallPolicy {
    pub fn from_config(config: &CallsConfig) -> Self {
        Self {
            target_prefixes: config
                .target_prefixes
                .iter()
                .filter(|prefix| !prefix.trim().is_empty())
                .cloned()
                .collect(),
            legacy_titles: config.legacy_titles.clone(),
        }
    }

    pub fn is_incoming_call(&self, notification: &Notification) -> bool {
        notification.kind == NotificationKind::IncomingCall
            || self
                .legacy_titles
                .iter()
                .any(|title| title == &notification.title)
    }

    /// Returns the call-session locator of `notification`, or why it has none.
    pub fn call_target<'a>(
        &self,
        notification: &'a Notification,
    ) -> Result<&'a str, NotificationError> {
        let malformed = |reason: &str| NotificationError::Malformed {
            id: notification.id.clone(),
            reason: reason.into(),
        };

        let target = notification
            .target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| malformed("missing target"))?;

        if target.chars().any(char::is_whitespace) {
            return Err(malformed("target contains whitespace"));
        }

        let session = self
            .target_prefixes
            .iter()
            .find_map(|prefix| target.strip_prefix(prefix.as_str()))
            .ok_or_else(|| malformed("target is not a call-session locator"))?;

        if session.trim_matches('/').is_empty() {
            return Err(malformed("target names no call session"));
        }

        Ok(target)
    }
}
