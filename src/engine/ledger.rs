use std::collections::HashSet;

/// Ids of notifications already handed to the alert state machine.
///
/// Grows for the lifetime of the process; there is deliberately no removal.
#[derive(Debug, Default, Clone)]
pub struct DedupLedger {
    seen: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen(&self, notification_id: &str) -> bool {
        self.seen.contains(notification_id)
    }

    /// Returns `false` if the id was already recorded.
    pub fn mark_seen(&mut self, notification_id: impl Into<String>) -> bool {
        self.seen.insert(notification_id.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
