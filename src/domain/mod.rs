pub mod entities;
pub mod value_objects;

pub use entities::{CartEntry, Measurement, OrderSubmission, PendingOperation};
pub use value_objects::{PendingOperationId, PendingOperationType, StorageKey};
