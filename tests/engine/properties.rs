use call_arbiter::engine::{Arbiter, ArbiterEvent, AlertState};
use call_arbiter::notification::{MemorySource, Notification, NotificationSource};
use call_arbiter::Config;
use std::collections::HashMap;
use std::sync::Arc;

fn overlapping_feeds() -> Vec<Vec<Notification>> {
    let call = |id: &str| Notification::incoming_call(id, format!("/meeting/{id}"));
    vec![
        vec![call("a"), call("b")],
        vec![call("b"), call("c")],
        vec![call("a"), call("c"), call("d")],
        vec![call("d")],
        vec![call("a"), call("b"), call("c"), call("d")],
    ]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_observers_present_exactly_one_alert() {
    let source = MemorySource::new();
    let arbiter = Arbiter::new(Arc::new(source), &Config::default());
    let feed: Arc<Vec<Notification>> = Arc::new(
        (0..5)
            .map(|i| Notification::incoming_call(format!("n{i}"), format!("call/{i}")))
            .collect(),
    );

    let mut handles = Vec::new();
    for _ in 0..16 {
        let arbiter = arbiter.clone();
        let feed = Arc::clone(&feed);
        handles.push(tokio::spawn(async move { arbiter.observe(&feed) }));
    }

    let mut presented = Vec::new();
    for handle in handles {
        if let Some(alert) = handle.await.unwrap() {
            presented.push(alert.notification_id);
        }
    }
    assert_eq!(presented, ["n0"]);
    assert_eq!(arbiter.seen_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_polls_never_overlap_alerts_or_repeat_ids() {
    let source = MemorySource::new();
    let arbiter = Arbiter::new(Arc::new(source), &Config::default());
    let mut events = arbiter.subscribe();

    for round in 0..4 {
        for feed in overlapping_feeds() {
            if let Some(alert) = arbiter.observe(&feed) {
                let id = alert.notification_id.clone();
                if round % 2 == 0 {
                    arbiter.accept(&id).await.unwrap();
                } else {
                    arbiter.decline(&id).await.unwrap();
                }
            }
        }
    }

    let mut active: Option<String> = None;
    let mut presentations: HashMap<String, usize> = HashMap::new();
    while let Ok(event) = events.try_recv() {
        match event {
            ArbiterEvent::StateChanged {
                state: AlertState::Presenting(alert),
                ..
            } => {
                assert!(active.is_none(), "second alert presented while one is active");
                *presentations.entry(alert.notification_id.clone()).or_default() += 1;
                active = Some(alert.notification_id);
            }
            ArbiterEvent::StateChanged {
                state: AlertState::Resolving { alert, .. },
                ..
            } => assert_eq!(active.as_deref(), Some(alert.notification_id.as_str())),
            ArbiterEvent::StateChanged {
                state: AlertState::Idle,
                ..
            } => active = None,
            ArbiterEvent::Navigate { .. } => assert!(active.is_none()),
        }
    }

    assert_eq!(presentations.len(), 4);
    assert!(presentations.values().all(|count| *count == 1));
}

#[tokio::test]
async fn double_action_resolves_once() {
    let source = MemorySource::new();
    let id = source.ring("call/42");
    let feed = source.list_notifications("me").await.unwrap();
    let arbiter = Arbiter::new(Arc::new(source.clone()), &Config::default());
    let mut events = arbiter.subscribe();
    assert_eq!(arbiter.observe(&feed).unwrap().notification_id, id);

    let (accepted, declined) = tokio::join!(arbiter.accept(&id), arbiter.decline(&id));
    assert!(accepted.is_some());
    assert!(declined.is_none());
    assert!(arbiter.accept(&id).await.is_none());

    let resolving = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|e| {
            matches!(
                e,
                ArbiterEvent::StateChanged {
                    state: AlertState::Resolving { .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(resolving, 1);
    // One optimistic, one authoritative.
    assert_eq!(source.mark_read_count(&id), 2);
}

#[tokio::test]
async fn repeated_mark_read_is_harmless() {
    let source =
        MemorySource::with_notifications(vec![Notification::incoming_call("n1", "call/42")]);

    source.mark_read("n1").await.unwrap();
    let once = source.list_notifications("me").await.unwrap();
    source.mark_read("n1").await.unwrap();
    let twice = source.list_notifications("me").await.unwrap();

    assert_eq!(once, twice);
}
