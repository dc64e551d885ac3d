// Polling constants (no magic values)

/// Poll interval when no job is QUEUED or RUNNING (30s)
pub const IDLE_POLL_INTERVAL_MS: u64 = 30_000;

/// Queued question-generation jobs feed an interactive review screen
/// and start quickly (2s)
pub const QUEUED_URGENT_INTERVAL_MS: u64 = 2_000;

/// Other queued jobs (2.5s) - still faster than early-stage running
/// jobs, because the queued->running flip is the change users wait for
pub const QUEUED_INTERVAL_MS: u64 = 2_500;

/// Running below 50% progress (3s)
pub const RUNNING_EARLY_INTERVAL_MS: u64 = 3_000;

/// Running question-generation below 50% progress (2.5s)
pub const RUNNING_URGENT_EARLY_INTERVAL_MS: u64 = 2_500;

/// Running at 50-89% progress (2s)
pub const RUNNING_MID_INTERVAL_MS: u64 = 2_000;

/// Running at >=90% progress - completion is imminent, poll fastest (1s)
pub const RUNNING_FINAL_INTERVAL_MS: u64 = 1_000;

/// Progress threshold separating early from mid-stage running jobs
pub const PROGRESS_MID_THRESHOLD: u8 = 50;

/// Progress threshold at which completion is considered imminent
pub const PROGRESS_FINAL_THRESHOLD: u8 = 90;

/// A terminal job missing from this many consecutive snapshots is
/// evicted from the store
pub const EVICTION_MISS_THRESHOLD: u32 = 3;

/// Default limit passed to JobSource::fetch_active_jobs
pub const DEFAULT_ACTIVE_FETCH_LIMIT: usize = 50;

/// Default limit passed to JobSource::fetch_completed_jobs
pub const DEFAULT_COMPLETED_FETCH_LIMIT: usize = 20;

/// Default capacity of the change-event broadcast channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;
