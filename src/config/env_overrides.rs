use super::Config;
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(user_id) = std::env::var("CALL_ARBITER_USER_ID")
            && !user_id.is_empty()
        {
            self.user_id = user_id;
        }

        if let Ok(interval_str) = std::env::var("CALL_ARBITER_POLL_INTERVAL_SECS")
            && let Ok(interval) = interval_str.parse::<u64>()
            && interval > 0
        {
            self.poll.interval_secs = interval;
        }

        if let Ok(path) = std::env::var("CALL_ARBITER_FEED_PATH")
            && !path.is_empty()
        {
            self.feed.path = Some(PathBuf::from(path));
        }

        if let Ok(level) = std::env::var("CALL_ARBITER_LOG_LEVEL")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
