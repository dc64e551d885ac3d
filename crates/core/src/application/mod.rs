// Application Layer - Monitoring use cases

pub mod constants;
pub mod events;
pub mod interval;
pub mod poller;
pub mod reconcile;
pub mod shutdown;
pub mod stats;
pub mod store;
pub mod window;

// Re-exports
pub use events::{EventBus, EventReceiver};
pub use interval::compute_interval;
pub use poller::{PollerConfig, PollingScheduler};
pub use reconcile::ReconciliationEngine;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use stats::{aggregate, JobStatistics};
pub use store::JobStateStore;
pub use window::{estimate_remaining_ms, resolve_week};
