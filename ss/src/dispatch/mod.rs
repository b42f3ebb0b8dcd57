//! Rate-limited, retrying dispatch of work items
//!
//! The [`Dispatcher`] drains a [`DispatchQueue`] into a
//! [`Submitter`](crate::submit::Submitter), issuing at most
//! `tokens_per_interval` submissions per `interval_ms` and putting failed
//! items back at the tail of the queue.

mod config;
mod core;
mod limiter;
mod queue;

pub use config::{DispatchConfig, RetryPolicy};
pub use core::{DispatchPhase, DispatchState, Dispatcher};
pub use limiter::RateLimiter;
pub use queue::{DispatchQueue, DispatchReport, DispatchStats, EmptyQueue, QueuedItem};
