use serde::{Deserialize, Serialize};
use std::fmt;

/// ドレイン時にどのリプレイハンドラへ渡すかを決める操作種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperationType {
    CartSync,
    MeasurementSave,
    OrderSubmit,
}

impl PendingOperationType {
    pub const ALL: [PendingOperationType; 3] = [
        PendingOperationType::CartSync,
        PendingOperationType::MeasurementSave,
        PendingOperationType::OrderSubmit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PendingOperationType::CartSync => "cart_sync",
            PendingOperationType::MeasurementSave => "measurement_save",
            PendingOperationType::OrderSubmit => "order_submit",
        }
    }
}

impl fmt::Display for PendingOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PendingOperationType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("Unknown pending operation type: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_tag_matches_as_str() {
        for kind in PendingOperationType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(PendingOperationType::try_from(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(PendingOperationType::try_from("wishlist_sync").is_err());
    }
}
