//! Notification feed model and the sources the engine polls.

mod file;
mod memory;
mod source;
mod types;

pub use file::FileSource;
pub use memory::MemorySource;
pub use source::{NotificationSource, SourceFuture};
pub use types::{CallPolicy, FeedPayload, Notification, NotificationKind};
