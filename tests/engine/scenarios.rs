use call_arbiter::engine::{AckOutcome, AlertState, Arbiter, ArbiterEvent, EventReceiver, Intent};
use call_arbiter::notification::{MemorySource, Notification, NotificationKind};
use call_arbiter::Config;
use std::sync::Arc;
use std::time::Duration;

fn arbiter_with(source: &MemorySource) -> Arbiter {
    Arbiter::new(Arc::new(source.clone()), &Config::default())
}

fn drain(events: &mut EventReceiver) -> Vec<ArbiterEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

fn state_names(events: &[ArbiterEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event {
            ArbiterEvent::StateChanged { state, .. } => state.name(),
            ArbiterEvent::Navigate { .. } => "navigate",
        })
        .collect()
}

#[tokio::test]
async fn basic_accept_presents_acknowledges_and_navigates_once() {
    let feed = vec![Notification::incoming_call("n1", "call/42")];
    let source = MemorySource::with_notifications(feed.clone());
    let arbiter = arbiter_with(&source);
    let mut events = arbiter.subscribe();

    let alert = arbiter.observe(&feed).unwrap();
    assert_eq!(alert.notification_id, "n1");
    assert!(arbiter.has_seen("n1"));
    assert!(matches!(arbiter.state(), AlertState::Presenting(ref a) if a.notification_id == "n1"));

    tokio::task::yield_now().await;
    assert_eq!(source.mark_read_count("n1"), 1, "optimistic ack issued on presentation");

    let resolution = arbiter.accept("n1").await.unwrap();
    assert_eq!(resolution.intent, Intent::Accept);
    assert_eq!(resolution.ack, AckOutcome::Acknowledged);
    assert_eq!(resolution.navigate_to.as_deref(), Some("call/42"));
    assert_eq!(source.mark_read_count("n1"), 2, "authoritative ack issued on resolution");
    assert!(arbiter.state().is_idle());

    let events = drain(&mut events);
    assert_eq!(
        state_names(&events),
        ["presenting", "resolving", "idle", "navigate"]
    );
    let navigations = events
        .iter()
        .filter(|e| matches!(e, ArbiterEvent::Navigate { target } if target == "call/42"))
        .count();
    assert_eq!(navigations, 1);
}

#[tokio::test]
async fn resolving_event_carries_lock() {
    let feed = vec![Notification::incoming_call("n1", "call/42")];
    let source = MemorySource::with_notifications(feed.clone());
    let arbiter = arbiter_with(&source);
    let mut events = arbiter.subscribe();

    arbiter.observe(&feed).unwrap();
    arbiter.decline("n1").await.unwrap();

    let locks: Vec<bool> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            ArbiterEvent::StateChanged { locked, .. } => Some(locked),
            ArbiterEvent::Navigate { .. } => None,
        })
        .collect();
    assert_eq!(locks, [false, true, false]);
}

#[tokio::test(start_paused = true)]
async fn duplicate_polls_never_resurface_the_same_call() {
    let feed = vec![Notification::incoming_call("n1", "call/42")];
    let source = MemorySource::new();
    source.set_ack_delay(Some(Duration::from_secs(1)));
    let arbiter = arbiter_with(&source);

    arbiter.observe(&feed).unwrap();
    // Still unread in the feed while presenting.
    assert!(arbiter.observe(&feed).is_none());

    let resolving = {
        let arbiter = arbiter.clone();
        tokio::spawn(async move { arbiter.accept("n1").await })
    };
    tokio::task::yield_now().await;
    assert!(matches!(arbiter.state(), AlertState::Resolving { .. }));
    assert!(arbiter.observe(&feed).is_none());

    resolving.await.unwrap().unwrap();
    assert!(arbiter.state().is_idle());
    assert!(arbiter.observe(&feed).is_none());
    assert!(arbiter.observe(&feed).is_none());
    assert_eq!(arbiter.seen_count(), 1);
}

#[tokio::test]
async fn decline_emits_no_navigation_and_keeps_id_seen() {
    let feed = vec![Notification::incoming_call("n2", "/meeting/7")];
    let source = MemorySource::with_notifications(feed.clone());
    let arbiter = arbiter_with(&source);
    let mut events = arbiter.subscribe();

    arbiter.observe(&feed).unwrap();
    let resolution = arbiter.decline("n2").await.unwrap();

    assert_eq!(resolution.intent, Intent::Decline);
    assert!(resolution.navigate_to.is_none());
    assert!(arbiter.state().is_idle());
    assert!(arbiter.has_seen("n2"));
    assert!(
        !drain(&mut events)
            .iter()
            .any(|e| matches!(e, ArbiterEvent::Navigate { .. }))
    );

    let unread_again = vec![Notification::incoming_call("n2", "/meeting/7")];
    assert!(arbiter.observe(&unread_again).is_none());
}

#[tokio::test]
async fn malformed_call_is_never_selected() {
    let mut empty = Notification::incoming_call("m1", "");
    let mut garbage = Notification::incoming_call("m2", "not a locator");
    let source = MemorySource::new();
    let arbiter = arbiter_with(&source);

    assert!(arbiter.observe(&[empty.clone(), garbage.clone()]).is_none());

    empty.is_read = true;
    garbage.target = None;
    assert!(arbiter.observe(&[empty, garbage]).is_none());
    assert!(arbiter.state().is_idle());
    assert_eq!(arbiter.seen_count(), 0);
    assert!(source.mark_read_calls().is_empty());
}

#[tokio::test]
async fn legacy_titled_general_notification_rings() {
    let mut legacy = Notification::new("old-1", NotificationKind::General);
    legacy.title = "Incoming Call".into();
    legacy.target = Some("/meeting/abc".into());
    let source = MemorySource::with_notifications(vec![legacy.clone()]);
    let arbiter = arbiter_with(&source);

    let alert = arbiter.observe(&[legacy]).unwrap();
    assert_eq!(alert.target, "/meeting/abc");
}
