use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityState {
    pub is_connected: bool,
    /// `None` はプラットフォームがまだ到達性を判定していない状態
    pub is_internet_reachable: Option<bool>,
}

impl ConnectivityState {
    pub const fn online() -> Self {
        Self {
            is_connected: true,
            is_internet_reachable: Some(true),
        }
    }

    pub const fn offline() -> Self {
        Self {
            is_connected: false,
            is_internet_reachable: Some(false),
        }
    }

    pub fn is_online(&self) -> bool {
        self.is_connected && self.is_internet_reachable != Some(false)
    }
}

pub trait ConnectivitySignal: Send + Sync {
    fn state(&self) -> ConnectivityState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_reachability_counts_as_online() {
        let state = ConnectivityState {
            is_connected: true,
            is_internet_reachable: None,
        };
        assert!(state.is_online());
    }

    #[test]
    fn connected_but_unreachable_is_offline() {
        let state = ConnectivityState {
            is_connected: true,
            is_internet_reachable: Some(false),
        };
        assert!(!state.is_online());
        assert!(!ConnectivityState::offline().is_online());
        assert!(ConnectivityState::online().is_online());
    }
}
