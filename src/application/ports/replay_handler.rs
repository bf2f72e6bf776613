use crate::domain::value_objects::OfflinePayload;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// 保留操作 1 件をリモートへ再送する。
#[async_trait]
pub trait ReplayHandler: Send + Sync {
    async fn replay(&self, payload: &OfflinePayload) -> Result<(), AppError>;
}
