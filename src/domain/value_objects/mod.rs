pub mod offline;

pub use offline::{OfflinePayload, PendingOperationId, PendingOperationType, StorageKey};
