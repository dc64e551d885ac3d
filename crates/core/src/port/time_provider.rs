// Time Provider Port (for testability)

use chrono::{DateTime, Utc};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Get current time as a UTC datetime (for week-window queries)
    fn now_utc(&self) -> DateTime<Utc>;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        chrono::Utc::now()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Mock TimeProvider with a settable clock
    pub struct MockTimeProvider {
        current_millis: AtomicI64,
    }

    impl MockTimeProvider {
        pub fn new(current_millis: i64) -> Self {
            Self {
                current_millis: AtomicI64::new(current_millis),
            }
        }

        /// Advance the mock clock
        pub fn advance(&self, delta_ms: i64) {
            self.current_millis.fetch_add(delta_ms, Ordering::SeqCst);
        }
    }

    impl TimeProvider for MockTimeProvider {
        fn now_millis(&self) -> i64 {
            self.current_millis.load(Ordering::SeqCst)
        }

        fn now_utc(&self) -> DateTime<Utc> {
            DateTime::<Utc>::from_timestamp_millis(self.current_millis.load(Ordering::SeqCst))
                .unwrap_or_else(Utc::now)
        }
    }
}
