pub mod connectivity;
pub mod notifier;
pub mod remote_service;
pub mod replay_handler;
pub mod storage_backend;

pub use connectivity::{ConnectivitySignal, ConnectivityState};
pub use notifier::{NotificationAction, Notifier, Severity};
pub use remote_service::RemoteEntityService;
pub use replay_handler::ReplayHandler;
pub use storage_backend::StorageBackend;
