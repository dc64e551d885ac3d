// Time Window Resolver
//
// ISO Monday-start week boundaries for historical job queries, plus
// the best-effort remaining-time display hint. Pure functions, no I/O.

use chrono::{DateTime, Duration, Utc, Weekday};

use crate::domain::{JobRecord, JobStatus, WeekBoundary};

/// Resolve the week containing `reference`, shifted by `week_offset`
/// whole weeks (0 = current week, -1 = previous week).
///
/// The result always spans Monday 00:00:00.000 through Sunday
/// 23:59:59.999 UTC, regardless of locale.
pub fn resolve_week(reference: DateTime<Utc>, week_offset: i32) -> WeekBoundary {
    let monday = reference.date_naive().week(Weekday::Mon).first_day()
        + Duration::weeks(i64::from(week_offset));
    let sunday = monday + Duration::days(6);

    let start = monday
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    let end = sunday
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("end of day is always valid")
        .and_utc();

    WeekBoundary { start, end }
}

/// Linear remaining-time extrapolation from elapsed time and progress.
///
/// Display hint only; returns None whenever the inputs make the
/// estimate meaningless (not running, no start time, progress at 0).
pub fn estimate_remaining_ms(job: &JobRecord, now_millis: i64) -> Option<i64> {
    if job.status != JobStatus::Running || job.progress == 0 || job.progress >= 100 {
        return None;
    }
    let started_at = job.started_at?;
    let elapsed = now_millis - started_at;
    if elapsed <= 0 {
        return None;
    }

    let progress = i64::from(job.progress);
    Some(elapsed * (100 - progress) / progress)
}
