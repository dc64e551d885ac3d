//! End-to-end polling scenarios against a scripted job source
//!
//! Uses tokio's paused clock: sleeps auto-advance, so multi-minute
//! polling timelines run instantly and deterministically.

use std::sync::Arc;
use std::time::Duration;

use docwatch_core::application::{PollerConfig, PollingScheduler};
use docwatch_core::domain::{ChangeEvent, ChangeEventKind, JobKind, JobRecord, JobStatus};
use docwatch_core::port::job_source::mocks::MockJobSource;
use docwatch_core::port::time_provider::mocks::MockTimeProvider;

fn scheduler_with(source: Arc<MockJobSource>) -> PollingScheduler {
    PollingScheduler::new(
        source,
        Arc::new(MockTimeProvider::new(1_000_000)),
        PollerConfig::default(),
    )
}

fn drain(events: &mut docwatch_core::application::EventReceiver) -> Vec<ChangeEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// One job observed through its whole life: queued, running, finished,
/// evicted after three absent snapshots.
#[tokio::test(start_paused = true)]
async fn test_job_lifecycle_event_sequence() {
    let source = MockJobSource::new_shared();

    let queued = JobRecord::new("q1", JobKind::QuestionGeneration, JobStatus::Queued);
    let running = JobRecord::new("q1", JobKind::QuestionGeneration, JobStatus::Running)
        .with_progress(50)
        .with_started_at(2_000);
    let completed = JobRecord::new("q1", JobKind::QuestionGeneration, JobStatus::Completed)
        .with_progress(100)
        .with_started_at(2_000)
        .with_finished_at(6_000);

    // Tick 1: queued; tick 2: running; tick 3: gone from active,
    // reported by the completed feed; ticks 4+: absent everywhere
    source.push_active_snapshot(vec![queued]);
    source.push_active_snapshot(vec![running]);
    source.push_active_snapshot(vec![]);
    source.push_completed_snapshot(vec![]);
    source.push_completed_snapshot(vec![]);
    source.push_completed_snapshot(vec![completed]);
    source.push_completed_snapshot(vec![]);

    let scheduler = scheduler_with(source);
    let mut events = scheduler.subscribe();

    scheduler.start();
    // Ticks land at 0s, 2s, 4s, then idle-interval spacing; three idle
    // misses finish well within 100s of simulated time
    tokio::time::sleep(Duration::from_secs(100)).await;
    scheduler.stop();

    let observed = drain(&mut events);
    let kinds: Vec<ChangeEventKind> = observed.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ChangeEventKind::ProgressUpdate,
            ChangeEventKind::ProgressUpdate,
            ChangeEventKind::JobCompleted,
            ChangeEventKind::JobCleanup,
        ]
    );

    match &observed[2] {
        ChangeEvent::JobCompleted { job } => assert_eq!(job.status, JobStatus::Completed),
        other => panic!("expected JobCompleted, got {:?}", other),
    }
    assert_eq!(observed[3].job_id(), "q1");

    // Evicted: nothing left in the store
    assert!(scheduler.statistics().finished_total == 0);
    assert!(scheduler.active_jobs(10).is_empty());
}

/// Transport failures degrade to stale data, never to lost state or a
/// dead loop; the next good snapshot self-heals.
#[tokio::test(start_paused = true)]
async fn test_failure_degradation_and_recovery() {
    let source = MockJobSource::new_shared();
    let job = JobRecord::new("j1", JobKind::DocumentAnalysis, JobStatus::Running)
        .with_progress(40)
        .with_started_at(1_000);
    source.push_active_snapshot(vec![job.clone()]);

    let scheduler = scheduler_with(source.clone());
    let mut events = scheduler.subscribe();

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(drain(&mut events).len(), 1);

    // Remote goes dark for a while
    source.set_fail_fetches(true);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(drain(&mut events).is_empty(), "failed ticks must emit nothing");
    assert_eq!(scheduler.active_jobs(10)[0].progress, 40, "store keeps last good state");

    // Remote recovers with fresh progress
    source.set_fail_fetches(false);
    source.push_active_snapshot(vec![job.with_progress(90)]);
    tokio::time::sleep(Duration::from_secs(15)).await;
    scheduler.stop();

    let recovered = drain(&mut events);
    assert_eq!(recovered.len(), 1);
    assert_eq!(recovered[0].kind(), ChangeEventKind::ProgressUpdate);
    assert_eq!(scheduler.active_jobs(10)[0].progress, 90);
}

/// A rejected cancel action surfaces to its caller without touching
/// the polling loop.
#[tokio::test(start_paused = true)]
async fn test_cancel_failure_leaves_polling_untouched() {
    let source = MockJobSource::new_shared();
    source.push_active_snapshot(vec![JobRecord::new(
        "j1",
        JobKind::DocumentAnalysis,
        JobStatus::Running,
    )
    .with_progress(95)
    .with_started_at(1_000)]);
    source.set_fail_cancel(true);

    let scheduler = scheduler_with(source.clone());
    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let before = source.fetch_count();
    assert!(scheduler.cancel("j1").await.is_err());

    // Loop keeps ticking at the 1s completion-floor interval
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(source.fetch_count() > before);
    assert!(scheduler.is_running());
    scheduler.stop();
}
