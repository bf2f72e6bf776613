pub mod mock_connectivity;
pub mod mock_notifier;
pub mod mock_remote;

pub use mock_connectivity::*;
pub use mock_notifier::*;
pub use mock_remote::*;
