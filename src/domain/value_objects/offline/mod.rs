pub mod operation_type;
pub mod payload;
pub mod pending_operation_id;
pub mod storage_key;

pub use operation_type::PendingOperationType;
pub use payload::OfflinePayload;
pub use pending_operation_id::PendingOperationId;
pub use storage_key::StorageKey;
