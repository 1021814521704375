use call_arbiter::engine::{AlertState, Arbiter, ArbiterEvent, Poller};
use call_arbiter::notification::{FeedPayload, FileSource, Notification, NotificationSource};
use call_arbiter::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write_feed(path: &Path, notifications: Vec<Notification>) {
    let json = serde_json::to_string_pretty(&FeedPayload::new(notifications)).unwrap();
    std::fs::write(path, json).unwrap();
}

fn read_ids(path: &Path) -> Vec<String> {
    let sidecar = FileSource::new(path).read_path().to_path_buf();
    std::fs::read_to_string(sidecar)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn engine(path: PathBuf, config: &Config) -> (Arbiter, Poller) {
    let source: Arc<dyn NotificationSource> = Arc::new(FileSource::new(path));
    let arbiter = Arbiter::new(Arc::clone(&source), config);
    let poller = Poller::new(arbiter.clone(), source, config);
    (arbiter, poller)
}

#[tokio::test]
async fn accepted_call_is_marked_read_in_the_sidecar() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("feed.json");
    write_feed(
        &path,
        vec![
            Notification::incoming_call("n1", "/meeting/abc").with_message("Dr. Reyes is calling"),
            Notification::incoming_call("n2", "/meeting/def"),
        ],
    );
    let (arbiter, poller) = engine(path.clone(), &Config::default());

    let alert = poller.poll_once().await.unwrap().unwrap();
    assert_eq!(alert.notification_id, "n1");
    assert_eq!(alert.message, "Dr. Reyes is calling");
    assert!(poller.poll_once().await.unwrap().is_none());

    let resolution = arbiter.accept("n1").await.unwrap();
    assert_eq!(resolution.navigate_to.as_deref(), Some("/meeting/abc"));

    assert_eq!(read_ids(&path), ["n1"]);
    let feed = FileSource::new(&path).list_notifications("me").await.unwrap();
    assert!(feed[0].is_read);
    assert!(!feed[1].is_read);

    let next = poller.poll_once().await.unwrap().unwrap();
    assert_eq!(next.notification_id, "n2");
}

#[tokio::test]
async fn missing_feed_file_skips_the_cycle() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("feed.json");
    let (arbiter, poller) = engine(path.clone(), &Config::default());

    assert!(poller.poll_once().await.is_err());
    assert!(arbiter.state().is_idle());

    write_feed(&path, vec![Notification::incoming_call("n1", "call/1")]);
    assert!(poller.poll_once().await.unwrap().is_some());
}

#[tokio::test]
async fn run_loop_surfaces_call_written_to_the_feed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("feed.json");
    write_feed(&path, vec![Notification::incoming_call("n1", "call/9")]);

    let mut config = Config::default();
    config.poll.interval_secs = 1;
    let (arbiter, poller) = engine(path, &config);
    let mut events = arbiter.subscribe();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(poller.run(cancel.clone()));

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("alert should be presented on the first tick")
        .unwrap();
    assert!(matches!(
        event,
        ArbiterEvent::StateChanged {
            state: AlertState::Presenting(ref alert),
            locked: false,
        } if alert.notification_id == "n1"
    ));

    cancel.cancel();
    handle.await.unwrap();
}
