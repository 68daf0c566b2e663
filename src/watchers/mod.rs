//! Long-running monitors that run beside scan ingestion
//!
//! Each one checks the session's [`ShutdownFlag`](crate::session::ShutdownFlag)
//! and returns once it is set or once it has set it.

pub mod exit_keys;
pub mod idle;
pub mod liveness;
pub mod shutdown;
