pub mod dispatch;
mod watch;
