use super::syncable::SyncEntity;
use crate::domain::value_objects::{PendingOperationType, StorageKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub product_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub price: f64,
}

impl CartEntry {
    pub fn new(product_id: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            id: None,
            product_id: product_id.into(),
            quantity,
            size: None,
            color: None,
            price,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl SyncEntity for CartEntry {
    const SNAPSHOT_KEY: StorageKey = StorageKey::CartSnapshot;
    const OPERATION_TYPE: PendingOperationType = PendingOperationType::CartSync;

    fn entity_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
