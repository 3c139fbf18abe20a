// =============================================================================
// Request Rate Limiter — fixed one-minute window
// =============================================================================
//
// Each report request takes one slot from the current window.  Once the
// window's budget is spent further requests are refused until a periodic
// task (spawned by the server) resets the counter.
//
// Counters are atomics so handlers may query them without locking.
// =============================================================================

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Thread-safe fixed-window request limiter.
pub struct RateLimitTracker {
    limit_per_window: u32,
    used_in_window: AtomicU32,
    rejected_total: AtomicU64,
}

/// Immutable snapshot of the limiter (served by the health endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub limit_per_window: u32,
    pub used_in_window: u32,
    pub rejected_total: u64,
}

impl RateLimitTracker {
    pub fn new(limit_per_window: u32) -> Self {
        Self {
            limit_per_window,
            used_in_window: AtomicU32::new(0),
            rejected_total: AtomicU64::new(0),
        }
    }

    /// Take one slot.  Returns `false` when the window is exhausted.
    pub fn try_acquire(&self) -> bool {
        let acquired = self
            .used_in_window
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.limit_per_window).then_some(used + 1)
            })
            .is_ok();

        if !acquired {
            let rejected = self.rejected_total.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                limit = self.limit_per_window,
                rejected_total = rejected,
                "request rejected, rate limit reached"
            );
        }
        acquired
    }

    /// Start a new window (call from a periodic timer).
    pub fn reset_window(&self) {
        let used = self.used_in_window.swap(0, Ordering::AcqRel);
        if used > 0 {
            debug!(used, "rate-limit window reset");
        }
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        RateLimitSnapshot {
            limit_per_window: self.limit_per_window,
            used_in_window: self.used_in_window.load(Ordering::Acquire),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("limit_per_window", &self.limit_per_window)
            .field("used_in_window", &self.used_in_window.load(Ordering::Relaxed))
            .field("rejected_total", &self.rejected_total.load(Ordering::Relaxed))
            .finish()
    }
}
