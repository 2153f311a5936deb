//! Long-running tasks spawned at startup.
//!
//! Each task loops on a [`tokio::time::interval`] until its
//! [`CancellationToken`] fires, at which point it drains and returns.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod guard_janitor;
pub mod rollup_refresh;
