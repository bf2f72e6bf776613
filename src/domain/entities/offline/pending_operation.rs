use crate::domain::value_objects::{OfflinePayload, PendingOperationId, PendingOperationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// アウトボックスに積まれた、リモートへ再送待ちの変更。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingOperation {
    pub id: PendingOperationId,
    #[serde(rename = "type")]
    pub operation_type: PendingOperationType,
    pub data: OfflinePayload,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
}

impl PendingOperation {
    pub fn new(operation_type: PendingOperationType, data: OfflinePayload) -> Self {
        Self {
            id: PendingOperationId::generate(),
            operation_type,
            data,
            timestamp: Utc::now(),
            retry_count: 0,
        }
    }

    pub fn is_exhausted(&self, max_retries: u32) -> bool {
        self.retry_count >= max_retries
    }

    pub(crate) fn apply(&mut self, patch: &PendingOperationPatch) {
        if let Some(retry_count) = patch.retry_count {
            // retryCount は単調非減少
            self.retry_count = self.retry_count.max(retry_count);
        }
    }
}

/// `update` で部分的にマージできるフィールド。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingOperationPatch {
    pub retry_count: Option<u32>,
}

impl PendingOperationPatch {
    pub fn retry_count(retry_count: u32) -> Self {
        Self {
            retry_count: Some(retry_count),
        }
    }
}
