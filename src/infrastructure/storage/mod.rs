pub mod file_backend;
pub mod memory_backend;
pub mod sqlite_backend;

pub use file_backend::FileStorageBackend;
pub use memory_backend::MemoryStorageBackend;
pub use sqlite_backend::SqliteStorageBackend;
