use crate::shared::error::AppError;
use async_trait::async_trait;

/// 文字列キー/値の永続化プリミティブ。
///
/// `LocalStore` はこの 3 操作以外に依存しない。
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn remove_item(&self, key: &str) -> Result<(), AppError>;
}
