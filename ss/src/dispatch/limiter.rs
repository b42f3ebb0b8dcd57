//! Sliding-window rate limiter
//!
//! Allows at most `limit` issuances within any trailing window of length
//! `window`. Uses tokio's clock so paused-time tests are deterministic.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Rate limiter for submission issuance
#[derive(Debug)]
pub struct RateLimiter {
    issued: VecDeque<Instant>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    /// `limit` tokens per `window`; a zero limit is treated as one
    pub fn new(limit: u32, window: Duration) -> Self {
        debug!(limit, ?window, "RateLimiter::new: called");
        Self {
            issued: VecDeque::new(),
            limit: (limit as usize).max(1),
            window,
        }
    }

    /// Take a token now if one is free, otherwise report how long to wait
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        let now = Instant::now();

        // Remove issuances outside the window
        while let Some(&oldest) = self.issued.front() {
            if now.duration_since(oldest) >= self.window {
                self.issued.pop_front();
            } else {
                break;
            }
        }

        if self.issued.len() < self.limit {
            self.issued.push_back(now);
            return Ok(());
        }

        let oldest = self.issued.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }

    /// Wait until a token is free and take it
    pub async fn acquire(&mut self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(retry_after) => {
                    debug!(?retry_after, "RateLimiter::acquire: rate limited, sleeping");
                    tokio::time::sleep(retry_after).await;
                }
            }
        }
    }
}
