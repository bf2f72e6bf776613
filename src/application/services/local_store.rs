use crate::application::ports::storage_backend::StorageBackend;
use crate::domain::value_objects::StorageKey;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// 名前付き JSON スナップショットのベストエフォートな永続化層。
///
/// どの操作も呼び出し元へエラーを返さない。バックエンドの失敗はログに残し、
/// 読み込みは欠損・破損のどちらでも空のデフォルト値にフォールバックする。
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn StorageBackend>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::warn!(
                    target: "offline::store",
                    key = key.as_str(),
                    error = %err,
                    "failed to serialize offline snapshot"
                );
                return;
            }
        };

        if let Err(err) = self.backend.set_item(key.as_str(), &serialized).await {
            tracing::warn!(
                target: "offline::store",
                key = key.as_str(),
                error = %err,
                "failed to persist offline snapshot"
            );
        }
    }

    pub async fn load<T: DeserializeOwned + Default>(&self, key: StorageKey) -> T {
        self.load_optional(key).await.unwrap_or_default()
    }

    /// 欠損・破損時は `None`
    pub async fn load_optional<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.backend.get_item(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    target: "offline::store",
                    key = key.as_str(),
                    error = %err,
                    "failed to read offline snapshot"
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(
                    target: "offline::store",
                    key = key.as_str(),
                    error = %err,
                    "discarding corrupt offline snapshot"
                );
                None
            }
        }
    }

    pub async fn remove(&self, key: StorageKey) {
        if let Err(err) = self.backend.remove_item(key.as_str()).await {
            tracing::warn!(
                target: "offline::store",
                key = key.as_str(),
                error = %err,
                "failed to remove offline snapshot"
            );
        }
    }

    /// ログアウト/リセット用に既知のキーをすべて削除する
    pub async fn clear_all(&self) {
        for key in StorageKey::ALL {
            self.remove(key).await;
        }
        tracing::info!(target: "offline::store", "offline store cleared");
    }

    pub async fn record_last_sync(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.save(StorageKey::LastSync, &now.timestamp_millis()).await;
        now
    }

    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.load_optional(StorageKey::LastSync).await?;
        Utc.timestamp_millis_opt(millis).single()
    }
}
