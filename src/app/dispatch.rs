use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result};
use call_arbiter::Config;
use call_arbiter::engine::{AlertState, DedupLedger, select_candidate};
use call_arbiter::notification::{CallPolicy, FileSource, NotificationSource};
use std::path::PathBuf;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Watch { feed, interval } => super::watch::run_watch(config, feed, interval).await,
        Commands::Check { feed } => check(&config, feed).await,
        Commands::Config => {
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to serialize config")?
            );
            Ok(())
        }
    }
}

pub(super) fn resolve_feed_path(config: &Config, feed: Option<PathBuf>) -> Result<PathBuf> {
    feed.or_else(|| config.feed.path.clone())
        .context("No notification feed configured: pass --feed or set feed.path")
}

async fn check(config: &Config, feed: Option<PathBuf>) -> Result<()> {
    let source = FileSource::new(resolve_feed_path(config, feed)?);
    let batch = source
        .list_notifications(&config.user_id)
        .await
        .with_context(|| format!("Failed to read feed {}", source.path().display()))?;

    let policy = CallPolicy::from_config(&config.calls);
    match select_candidate(&batch, &DedupLedger::new(), &AlertState::Idle, &policy) {
        Some(candidate) => println!(
            "Would present {} -> {} ({} notifications in feed)",
            candidate.notification.id,
            candidate.target,
            batch.len()
        ),
        None => println!("No candidate ({} notifications in feed)", batch.len()),
    }
    Ok(())
}
