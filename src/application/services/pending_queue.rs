use crate::application::services::local_store::LocalStore;
use crate::domain::entities::offline::{PendingOperation, PendingOperationPatch};
use crate::domain::value_objects::{
    OfflinePayload, PendingOperationId, PendingOperationType, StorageKey,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `pending_operations` キー上に載るアウトボックス。
///
/// 各変更は読み込み→変更→書き戻しの全体書き換えになるため、
/// 同一プロセス内の呼び出しは `gate` で直列化して更新の取りこぼしを防ぐ。
pub struct PendingOperationQueue {
    store: Arc<LocalStore>,
    gate: Mutex<()>,
}

impl PendingOperationQueue {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    /// 戻った時点で永続化済み（ストアが書き込みに失敗した場合はログのみ）
    pub async fn enqueue(
        &self,
        operation_type: PendingOperationType,
        data: OfflinePayload,
    ) -> PendingOperationId {
        let _guard = self.gate.lock().await;
        let mut operations = self.read().await;

        let operation = PendingOperation::new(operation_type, data);
        let id = operation.id.clone();
        operations.push(operation);
        self.write(&operations).await;

        tracing::debug!(
            target: "offline::queue",
            id = %id,
            operation_type = %operation_type,
            pending = operations.len(),
            "pending operation enqueued"
        );
        id
    }

    pub async fn list_all(&self) -> Vec<PendingOperation> {
        let _guard = self.gate.lock().await;
        self.read().await
    }

    pub async fn len(&self) -> usize {
        self.list_all().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn remove(&self, id: &PendingOperationId) {
        let _guard = self.gate.lock().await;
        let mut operations = self.read().await;
        let before = operations.len();
        operations.retain(|operation| &operation.id != id);

        if operations.len() != before {
            self.write(&operations).await;
            tracing::debug!(target: "offline::queue", id = %id, "pending operation removed");
        }
    }

    pub async fn update(&self, id: &PendingOperationId, patch: PendingOperationPatch) {
        let _guard = self.gate.lock().await;
        let mut operations = self.read().await;

        let Some(operation) = operations.iter_mut().find(|operation| &operation.id == id) else {
            return;
        };
        operation.apply(&patch);
        let retry_count = operation.retry_count;
        self.write(&operations).await;

        tracing::debug!(
            target: "offline::queue",
            id = %id,
            retry_count,
            "pending operation updated"
        );
    }

    /// `retryCount >= max_retries` のエントリを再送せずに取り除き、取り除いたものを返す
    pub async fn remove_exhausted(&self, max_retries: u32) -> Vec<PendingOperation> {
        let _guard = self.gate.lock().await;
        let operations = self.read().await;

        let (evicted, kept): (Vec<_>, Vec<_>) = operations
            .into_iter()
            .partition(|operation| operation.is_exhausted(max_retries));

        if !evicted.is_empty() {
            self.write(&kept).await;
        }
        evicted
    }

    async fn read(&self) -> Vec<PendingOperation> {
        self.store.load(StorageKey::PendingOperations).await
    }

    async fn write(&self, operations: &[PendingOperation]) {
        self.store.save(StorageKey::PendingOperations, operations).await;
    }
}
