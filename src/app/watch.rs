use super::dispatch::resolve_feed_path;
use anyhow::Result;
use call_arbiter::Config;
use call_arbiter::diagnostics::health;
use call_arbiter::engine::{AlertState, Arbiter, ArbiterEvent, Poller};
use call_arbiter::notification::{FileSource, NotificationSource};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

pub(super) async fn run_watch(
    mut config: Config,
    feed: Option<PathBuf>,
    interval: Option<u64>,
) -> Result<()> {
    if let Some(secs) = interval {
        config.poll.interval_secs = secs.max(1);
    }
    let source: Arc<dyn NotificationSource> =
        Arc::new(FileSource::new(resolve_feed_path(&config, feed)?));
    let arbiter = Arbiter::new(Arc::clone(&source), &config);
    let mut events = arbiter.subscribe();

    let cancel = CancellationToken::new();
    let poller = tokio::spawn(Poller::new(arbiter.clone(), source, &config).run(cancel.clone()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event display fell behind; skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => answer(&arbiter, line.trim()),
                None => break,
            },
        }
    }

    cancel.cancel();
    poller.await?;
    println!("{}", serde_json::to_string_pretty(&health::snapshot_json())?);
    Ok(())
}

fn answer(arbiter: &Arbiter, input: &str) {
    let AlertState::Presenting(alert) = arbiter.state() else {
        if !input.is_empty() {
            println!("No call is ringing.");
        }
        return;
    };

    let arbiter = arbiter.clone();
    match input {
        "a" | "accept" => {
            tokio::spawn(async move { arbiter.accept(&alert.notification_id).await });
        }
        "d" | "decline" => {
            tokio::spawn(async move { arbiter.decline(&alert.notification_id).await });
        }
        _ => println!("Answer with `a` (accept) or `d` (decline)."),
    }
}

fn print_event(event: &ArbiterEvent) {
    match event {
        ArbiterEvent::StateChanged {
            state: AlertState::Presenting(alert),
            ..
        } => {
            let caller = if alert.message.is_empty() {
                "Incoming call"
            } else {
                alert.message.as_str()
            };
            println!("[ringing] {caller} ({}) - accept? [a/d]", alert.notification_id);
        }
        ArbiterEvent::StateChanged {
            state: AlertState::Resolving { alert, intent },
            ..
        } => println!("[{intent}] {}", alert.notification_id),
        ArbiterEvent::StateChanged {
            state: AlertState::Idle,
            ..
        } => println!("[idle]"),
        ArbiterEvent::Navigate { target } => println!("[join] {target}"),
    }
}
