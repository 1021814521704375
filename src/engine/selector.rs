use super::{AlertState, DedupLedger};
use crate::notification::{CallPolicy, Notification};

/// A notification eligible for presentation, with its validated target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub notification: &'a Notification,
    pub target: &'a str,
}

/// Pick at most one alert candidate from a feed snapshot.
///
/// Nothing is selected while another alert is presenting or resolving.
/// Otherwise the first unread, unseen incoming call with a well-formed target
/// wins, in feed order; the feed order is the priority order.
pub fn select_candidate<'a>(
    batch: &'a [Notification],
    ledger: &DedupLedger,
    state: &AlertState,
    policy: &CallPolicy,
) -> Option<Candidate<'a>> {
    if !state.is_idle() {
        return None;
    }

    batch
        .iter()
        .filter(|n| policy.is_incoming_call(n) && !n.is_read && !ledger.has_seen(&n.id))
        .find_map(|notification| match policy.call_target(notification) {
            Ok(target) => Some(Candidate {
                notification,
                target,
            }),
            Err(e) => {
                tracing::debug!("Skipping call notification: {e}");
                None
            }
        })
}
