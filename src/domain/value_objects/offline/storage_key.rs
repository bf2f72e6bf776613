use serde::{Deserialize, Serialize};
use std::fmt;

/// ローカルストアで使う予約済みキー。
///
/// キー名はここで閉じているため、コンポーネント間でキーが衝突することはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKey {
    CartSnapshot,
    MeasurementSnapshot,
    PendingOperations,
    LastSync,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::CartSnapshot,
        StorageKey::MeasurementSnapshot,
        StorageKey::PendingOperations,
        StorageKey::LastSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::CartSnapshot => "offline_cart",
            StorageKey::MeasurementSnapshot => "offline_measurements",
            StorageKey::PendingOperations => "pending_operations",
            StorageKey::LastSync => "last_sync",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
