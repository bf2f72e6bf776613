pub mod cart_entry;
pub mod measurement;
pub mod offline;
pub mod order;
pub mod syncable;

pub use cart_entry::CartEntry;
pub use measurement::Measurement;
pub use offline::{DrainReport, PendingOperation, PendingOperationPatch};
pub use order::OrderSubmission;
pub use syncable::{upsert_into, SyncEntity};
