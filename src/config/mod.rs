mod env_overrides;
mod loader;
mod types;

pub use types::{AckConfig, CallsConfig, Config, FeedConfig, ObservabilityConfig, PollConfig};
