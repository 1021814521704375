use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// User whose notification feed is polled.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub ack: AckConfig,

    #[serde(default)]
    pub calls: CallsConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_user_id() -> String {
    "me".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    /// Decline a presented alert after this many seconds. `0` disables.
    pub ring_timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            ring_timeout_secs: 0,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn ring_timeout(&self) -> Option<Duration> {
        (self.ring_timeout_secs > 0).then(|| Duration::from_secs(self.ring_timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AckConfig {
    /// Upper bound on how long resolution waits for the authoritative mark-read.
    pub settle_timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for AckConfig {
    fn default() -> Self {
        Self {
            settle_timeout_ms: 3_000,
            max_attempts: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl AckConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallsConfig {
    /// A call target must start with one of these and carry a session id after it.
    pub target_prefixes: Vec<String>,
    /// Titles that mark a notification as an incoming call regardless of its type.
    pub legacy_titles: Vec<String>,
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            target_prefixes: vec!["/meeting/".into(), "call/".into()],
            legacy_titles: vec!["Incoming Call".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// JSON feed snapshot read by the file-backed source.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl ObservabilityConfig {
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(".call-arbiter").join("config.toml"),
            user_id: default_user_id(),
            poll: PollConfig::default(),
            ack: AckConfig::default(),
            calls: CallsConfig::default(),
            feed: FeedConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::Validation("user_id must not be empty".into()));
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll.interval_secs must be at least 1".into(),
            ));
        }
        if self.ack.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "ack.max_attempts must be at least 1".into(),
            ));
        }
        if self
            .calls
            .target_prefixes
            .iter()
            .all(|prefix| prefix.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "calls.target_prefixes must name at least one prefix".into(),
            ));
        }
        Ok(())
    }
}
