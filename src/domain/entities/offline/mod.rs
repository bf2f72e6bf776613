pub mod drain_report;
pub mod pending_operation;

pub use drain_report::DrainReport;
pub use pending_operation::{PendingOperation, PendingOperationPatch};
