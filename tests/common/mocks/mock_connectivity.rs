use std::sync::{Arc, RwLock};
use tailor_offline::application::ports::{ConnectivitySignal, ConnectivityState};

#[derive(Debug, Clone)]
pub struct MockConnectivity {
    state: Arc<RwLock<ConnectivityState>>,
}

impl MockConnectivity {
    pub fn online() -> Self {
        Self {
            state: Arc::new(RwLock::new(ConnectivityState::online())),
        }
    }

    pub fn offline() -> Self {
        Self {
            state: Arc::new(RwLock::new(ConnectivityState::offline())),
        }
    }

    pub fn set_online(&self, online: bool) {
        let next = if online {
            ConnectivityState::online()
        } else {
            ConnectivityState::offline()
        };
        *self.state.write().unwrap() = next;
    }
}

impl ConnectivitySignal for MockConnectivity {
    fn state(&self) -> ConnectivityState {
        *self.state.read().unwrap()
    }
}
