use super::syncable::SyncEntity;
use crate::domain::value_objects::{PendingOperationType, StorageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 採寸セット（部位名 → 数値）。ID はリモートが採番するため作成直後は `None`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub measurements: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Measurement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: None,
            name: name.into(),
            measurements: BTreeMap::new(),
            notes: None,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_value(mut self, part: impl Into<String>, value: f64) -> Self {
        self.measurements.insert(part.into(), value);
        self
    }
}

impl SyncEntity for Measurement {
    const SNAPSHOT_KEY: StorageKey = StorageKey::MeasurementSnapshot;
    const OPERATION_TYPE: PendingOperationType = PendingOperationType::MeasurementSave;

    fn entity_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
