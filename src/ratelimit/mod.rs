//! Per-User Rate Limiting
//!
//! In-process limiters keyed by user id. State is memory-resident and lost on
//! restart.
//!
//! ## Policies
//!
//! - [`FixedWindowLimiter`]: `{count, reset_at}` per user; the window starts
//!   on the first call after expiry
//! - [`SlidingLogLimiter`]: timestamps of the calls inside the trailing window
//!
//! Both use `DashMap` entry locking, so each check-and-record is atomic per
//! user while different users never contend. Users with nothing left inside
//! their window are dropped by [`RateLimiter::purge_expired`], which the
//! server runs on an interval via [`run_sweeper`].

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::types::{EstimateError, Result, UserId};

pub type SharedClock = Arc<dyn Clock>;
pub type SharedRateLimiter = Arc<dyn RateLimiter>;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// `Err(EstimateError::RateLimited)` when the call was refused
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Limited { retry_after } => Err(EstimateError::RateLimited { retry_after }),
        }
    }
}

/// Policy deciding whether a user may make another call right now
pub trait RateLimiter: Send + Sync {
    /// Check and, when allowed, record one call for `user`
    fn check(&self, user: &UserId) -> RateDecision;

    /// Drop users whose window holds nothing; returns how many were dropped
    fn purge_expired(&self) -> usize;

    /// Number of users currently holding state
    fn tracked_users(&self) -> usize;
}

/// Purge every limiter on a fixed interval, forever
pub async fn run_sweeper(limiters: Vec<SharedRateLimiter>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let dropped: usize = limiters.iter().map(|l| l.purge_expired()).sum();
        if dropped > 0 {
            debug!(dropped, "Purged idle rate-limit entries");
        }
    }
}

// =============================================================================
// Fixed Window
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: usize,
    reset_at: Instant,
}

pub struct FixedWindowLimiter {
    max_requests: usize,
    window: Duration,
    clock: SharedClock,
    entries: DashMap<UserId, WindowEntry>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: usize, window: Duration, clock: SharedClock) -> Self {
        Self {
            max_requests,
            window,
            clock,
            entries: DashMap::new(),
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, user: &UserId) -> RateDecision {
        let now = self.clock.now();
        let fresh = WindowEntry {
            count: 1,
            reset_at: now + self.window,
        };

        let mut entry = self.entries.entry(user.clone()).or_insert(WindowEntry {
            count: 0,
            reset_at: now,
        });

        if now >= entry.reset_at {
            *entry = fresh;
            return RateDecision::Allowed;
        }

        if entry.count >= self.max_requests {
            let retry_after = entry.reset_at.saturating_duration_since(now);
            debug!(user = %user, ?retry_after, "Fixed window limit reached");
            return RateDecision::Limited { retry_after };
        }

        entry.count += 1;
        RateDecision::Allowed
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.reset_at);
        before.saturating_sub(self.entries.len())
    }

    fn tracked_users(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Sliding Log
// =============================================================================

pub struct SlidingLogLimiter {
    max_requests: usize,
    window: Duration,
    clock: SharedClock,
    logs: DashMap<UserId, VecDeque<Instant>>,
}

impl SlidingLogLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: usize, window: Duration, clock: SharedClock) -> Self {
        Self {
            max_requests,
            window,
            clock,
            logs: DashMap::new(),
        }
    }
}

impl RateLimiter for SlidingLogLimiter {
    fn check(&self, user: &UserId) -> RateDecision {
        let now = self.clock.now();
        let mut log = self.logs.entry(user.clone()).or_default();

        // Keep only calls strictly inside the trailing window
        while log
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            log.pop_front();
        }

        if log.len() >= self.max_requests {
            let retry_after = log
                .front()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            debug!(user = %user, ?retry_after, "Sliding log limit reached");
            return RateDecision::Limited { retry_after };
        }

        log.push_back(now);
        RateDecision::Allowed
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.window;
        let before = self.logs.len();
        // newest call is at the back
        self.logs.retain(|_, log| {
            log.back()
                .is_some_and(|t| now.saturating_duration_since(*t) < window)
        });
        before.saturating_sub(self.logs.len())
    }

    fn tracked_users(&self) -> usize {
        self.logs.len()
    }
}
