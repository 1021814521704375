use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `call-arbiter` - surfaces incoming-call notifications exactly once.
#[derive(Parser, Debug)]
#[command(name = "call-arbiter")]
#[command(version = "0.1.0")]
#[command(about = "Watch a notification feed and arbitrate incoming-call alerts.", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.call-arbiter/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the feed and present incoming calls (answer with `a` or `d` on stdin)
    Watch {
        /// JSON feed snapshot to poll (overrides feed.path)
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Poll interval in seconds (overrides poll.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Poll once and show which call would be presented
    Check {
        /// JSON feed snapshot to read (overrides feed.path)
        #[arg(long)]
        feed: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}
