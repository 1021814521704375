use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `call-arbiter`.
///
/// Nothing in here is fatal to the engine: the worst outcome of any variant is
/// a missed or delayed alert. Library callers can match on these to decide
/// whether to retry; the binary uses `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum ArbiterError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Notification source ─────────────────────────────────────────────
    #[error("source: {0}")]
    Source(#[from] SourceError),

    // ── Notification content ────────────────────────────────────────────
    #[error("notification: {0}")]
    Notification(#[from] NotificationError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Source errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SourceError {
    /// Poll failed. The cycle is skipped and the engine keeps its state.
    #[error("notification source unavailable: {0}")]
    Unavailable(String),

    /// Mark-read failed. Logged only; never gates the alert lifecycle.
    #[error("acknowledge {id} failed: {message}")]
    AcknowledgeFailed { id: String, message: String },

    #[error("notification {0} not found")]
    NotFound(String),

    #[error("feed payload could not be decoded: {0}")]
    Decode(String),
}

impl SourceError {
    /// Whether repeating the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::AcknowledgeFailed { .. })
    }
}

// ─── Notification errors ─────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// Incoming-call notification without a usable call-session locator.
    /// Excluded from candidacy and never reported to the user.
    #[error("notification {id} is malformed: {reason}")]
    Malformed { id: String, reason: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ArbiterError>;
