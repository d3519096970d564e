//! Clock Collaborator
//!
//! The claim window is pure time arithmetic over `opened_at`, so the time
//! source is a seam: `SystemClock` in production, `ManualClock` in tests
//! and the demo so the window can be driven forward deterministically.

use std::sync::atomic::{AtomicI64, Ordering};

/// Current-time source (Unix seconds)
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock for tests and the demo mode
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_unix(), 1_000);
        clock.advance(90);
        assert_eq!(clock.now_unix(), 1_090);
        clock.set(5);
        assert_eq!(clock.now_unix(), 5);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // Sanity bound: after 2020-01-01
        assert!(SystemClock.now_unix() > 1_577_836_800);
    }
}
