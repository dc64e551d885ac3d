// Week Boundary Value Object

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ISO week: Monday 00:00:00.000 through Sunday 23:59:59.999,
/// both bounds inclusive, independent of locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBoundary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WeekBoundary {
    /// Whether `at` falls inside this week (inclusive on both ends)
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}
