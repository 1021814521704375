use super::{Candidate, DedupLedger, select_candidate};
use crate::notification::{CallPolicy, Notification};
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// The user's answer to a presented alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    Accept,
    Decline,
}

/// Transient projection of the candidate currently in front of the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub notification_id: String,
    pub target: String,
    pub message: String,
    pub presented_at: DateTime<Utc>,
    /// Monotonic presentation time, used by the ring timeout.
    pub presented_instant: Instant,
}

impl Alert {
    pub fn new(notification: &Notification, target: &str) -> Self {
        Self {
            notification_id: notification.id.clone(),
            target: target.to_string(),
            message: notification.message.clone(),
            presented_at: Utc::now(),
            presented_instant: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AlertState {
    #[default]
    Idle,
    Presenting(Alert),
    Resolving { alert: Alert, intent: Intent },
}

impl AlertState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn alert(&self) -> Option<&Alert> {
        match self {
            Self::Idle => None,
            Self::Presenting(alert) | Self::Resolving { alert, .. } => Some(alert),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Presenting(_) => "presenting",
            Self::Resolving { .. } => "resolving",
        }
    }
}

/// Ledger, current state and session lock of one user's alert lifecycle.
///
/// Pure bookkeeping with no I/O; [`super::Arbiter`] serializes every call.
#[derive(Debug, Default)]
pub struct AlertMachine {
    ledger: DedupLedger,
    state: AlertState,
    session_lock: bool,
}

impl AlertMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn is_locked(&self) -> bool {
        self.session_lock
    }

    /// Select from `batch` and, if a candidate exists, present it.
    ///
    /// The candidate id enters the ledger in the same step, before any user
    /// interaction is possible.
    pub fn offer(&mut self, batch: &[Notification], policy: &CallPolicy) -> Option<Alert> {
        let Candidate {
            notification,
            target,
        } = select_candidate(batch, &self.ledger, &self.state, policy)?;

        self.ledger.mark_seen(notification.id.as_str());
        let alert = Alert::new(notification, target);
        self.state = AlertState::Presenting(alert.clone());
        Some(alert)
    }

    /// Move the presented alert to resolving.
    ///
    /// Returns `None` (a no-op) when nothing is presented, the lock is held,
    /// or `notification_id` is not the presented alert.
    pub fn begin_resolution(&mut self, notification_id: &str, intent: Intent) -> Option<Alert> {
        if self.session_lock {
            return None;
        }
        let AlertState::Presenting(alert) = &self.state else {
            return None;
        };
        if alert.notification_id != notification_id {
            return None;
        }

        let alert = alert.clone();
        self.session_lock = true;
        self.state = AlertState::Resolving {
            alert: alert.clone(),
            intent,
        };
        Some(alert)
    }

    /// Return to idle from resolving and release the session lock.
    pub fn finish_resolution(&mut self) -> Option<(Alert, Intent)> {
        self.session_lock = false;
        match std::mem::take(&mut self.state) {
            AlertState::Resolving { alert, intent } => Some((alert, intent)),
            other => {
                self.state = other;
                None
            }
        }
    }
}
