use crate::shared::error::AppError;
use async_trait::async_trait;

/// ホスト型バックエンドのテーブル操作。
///
/// 再送時に同じエンティティを複数回受け取る可能性があるため、
/// 実装はエンティティ ID をキーにした冪等な upsert であることを前提とする。
#[async_trait]
pub trait RemoteEntityService<E>: Send + Sync
where
    E: Send + Sync + 'static,
{
    async fn create(&self, entity: &E) -> Result<(), AppError>;
    async fn list(&self) -> Result<Vec<E>, AppError>;
}
