//! Incoming-call arbitration.
//!
//! The poll loop hands each feed snapshot to [`Arbiter::observe`], which picks
//! at most one candidate, presents it and records it in the ledger inside a
//! single critical section. Accept/decline resolve the presented alert exactly
//! once and always return the machine to idle, whatever the mark-read outcome.

mod arbiter;
mod dispatcher;
mod events;
mod ledger;
mod poller;
mod selector;
mod state;

pub use arbiter::{Arbiter, Resolution};
pub use dispatcher::{AckDispatcher, AckOutcome, AckPhase};
pub use events::{ArbiterEvent, EventReceiver, EventSender, event_bus};
pub use ledger::DedupLedger;
pub use poller::Poller;
pub use selector::{Candidate, select_candidate};
pub use state::{Alert, AlertMachine, AlertState, Intent};
