pub mod local_store;
pub mod network_executor;
pub mod pending_queue;
pub mod queue_drainer;
pub mod replay_handlers;
pub mod snapshot_sync;

pub use local_store::LocalStore;
pub use network_executor::{ExecuteOptions, NetworkAwareExecutor};
pub use pending_queue::PendingOperationQueue;
pub use queue_drainer::QueueDrainer;
pub use replay_handlers::EntityReplayHandler;
pub use snapshot_sync::{CartSyncService, MeasurementSyncService, SaveOutcome, SnapshotSyncService};
