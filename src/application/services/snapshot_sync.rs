use crate::application::ports::notifier::{Notifier, Severity};
use crate::application::ports::remote_service::RemoteEntityService;
use crate::application::services::local_store::LocalStore;
use crate::application::services::network_executor::{ExecuteOptions, NetworkAwareExecutor};
use crate::application::services::pending_queue::PendingOperationQueue;
use crate::domain::entities::{upsert_into, CartEntry, Measurement, SyncEntity};
use crate::domain::value_objects::{OfflinePayload, PendingOperationId};
use crate::shared::config::NetworkConfig;
use crate::shared::error::AppError;
use std::sync::Arc;

pub const SAVED_OFFLINE_MESSAGE: &str = "Saved offline. Will sync when connection is restored.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// リモートへの書き込みまで完了した
    Synced,
    /// ローカルに保存し、アウトボックスへ積んだ
    Deferred { operation_id: PendingOperationId },
    /// ペイロード化できずローカルにのみ保存した
    LocalOnly,
}

impl SaveOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SaveOutcome::Synced)
    }
}

/// エンティティ単位の書き込みスルー + アウトボックス。
///
/// 呼び出し元から見た保存は常に成功する。リモートへの反映が恒久的に失敗したかどうかは
/// キュードレイナーの再送が上限に達した時点でのみ確定する。
pub struct SnapshotSyncService<E: SyncEntity> {
    remote: Arc<dyn RemoteEntityService<E>>,
    store: Arc<LocalStore>,
    queue: Arc<PendingOperationQueue>,
    notifier: Arc<dyn Notifier>,
    executor: Option<(Arc<NetworkAwareExecutor>, NetworkConfig)>,
}

pub type MeasurementSyncService = SnapshotSyncService<Measurement>;
pub type CartSyncService = SnapshotSyncService<CartEntry>;

impl<E: SyncEntity> SnapshotSyncService<E> {
    pub fn new(
        remote: Arc<dyn RemoteEntityService<E>>,
        store: Arc<LocalStore>,
        queue: Arc<PendingOperationQueue>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            remote,
            store,
            queue,
            notifier,
            executor: None,
        }
    }

    /// リモート書き込みを接続確認・再試行付きで行う
    pub fn with_executor(
        mut self,
        executor: Arc<NetworkAwareExecutor>,
        config: NetworkConfig,
    ) -> Self {
        self.executor = Some((executor, config));
        self
    }

    pub async fn save(&self, entity: E) -> SaveOutcome {
        match self.write_remote(&entity).await {
            Ok(()) => {
                self.cache(entity).await;
                SaveOutcome::Synced
            }
            Err(err) => {
                tracing::warn!(
                    target: "offline::sync",
                    operation_type = %E::OPERATION_TYPE,
                    error = %err,
                    "remote write failed, deferring to outbox"
                );

                let payload = match OfflinePayload::from_entity(&entity) {
                    Ok(payload) => payload,
                    Err(reason) => {
                        // JSON 化できないエンティティはそもそも再送できない
                        tracing::error!(
                            target: "offline::sync",
                            operation_type = %E::OPERATION_TYPE,
                            error = %reason,
                            "entity cannot be queued"
                        );
                        self.cache(entity).await;
                        self.notifier.notify(&reason, Severity::Error, None);
                        return SaveOutcome::LocalOnly;
                    }
                };

                self.cache(entity).await;
                let operation_id = self.queue.enqueue(E::OPERATION_TYPE, payload).await;

                // オフライン通知は実行ラッパー側で出しているので重ねない
                if !matches!(err, AppError::Offline) {
                    self.notifier
                        .notify(SAVED_OFFLINE_MESSAGE, Severity::Info, None);
                }
                SaveOutcome::Deferred { operation_id }
            }
        }
    }

    /// リモートから取得できればスナップショットを差し替え、失敗時はローカルを返す
    pub async fn load(&self) -> Vec<E> {
        match self.remote.list().await {
            Ok(entities) => {
                self.store.save(E::SNAPSHOT_KEY, &entities).await;
                self.store.record_last_sync().await;
                entities
            }
            Err(err) => {
                tracing::info!(
                    target: "offline::sync",
                    key = E::SNAPSHOT_KEY.as_str(),
                    error = %err,
                    "remote read failed, serving local snapshot"
                );
                self.cached().await
            }
        }
    }

    pub async fn cached(&self) -> Vec<E> {
        self.store.load(E::SNAPSHOT_KEY).await
    }

    async fn write_remote(&self, entity: &E) -> Result<(), AppError> {
        match &self.executor {
            Some((executor, config)) => {
                let remote = &self.remote;
                executor
                    .execute(
                        || remote.create(entity),
                        ExecuteOptions::from_config(config).silent_errors(),
                    )
                    .await
            }
            None => self.remote.create(entity).await,
        }
    }

    async fn cache(&self, entity: E) {
        let mut snapshot = self.cached().await;
        upsert_into(&mut snapshot, entity);
        self.store.save(E::SNAPSHOT_KEY, &snapshot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::connectivity::{ConnectivitySignal, ConnectivityState};
    use crate::application::ports::notifier::NotificationAction;
    use crate::domain::value_objects::{PendingOperationType, StorageKey};
    use crate::infrastructure::storage::MemoryStorageBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlakyRemote {
        fail: AtomicBool,
        creates: AtomicU32,
        rows: Mutex<Vec<Measurement>>,
    }

    impl FlakyRemote {
        fn failing() -> Self {
            let remote = Self::default();
            remote.fail.store(true, Ordering::SeqCst);
            remote
        }
    }

    #[async_trait]
    impl RemoteEntityService<Measurement> for FlakyRemote {
        async fn create(&self, entity: &Measurement) -> Result<(), AppError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Network("connection reset".into()));
            }
            self.rows.lock().unwrap().push(entity.clone());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<Measurement>, AppError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Network("connection reset".into()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, _severity: Severity, _action: Option<NotificationAction>) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    struct Offline;

    impl ConnectivitySignal for Offline {
        fn state(&self) -> ConnectivityState {
            ConnectivityState::offline()
        }
    }

    struct Fixture {
        service: MeasurementSyncService,
        remote: Arc<FlakyRemote>,
        store: Arc<LocalStore>,
        queue: Arc<PendingOperationQueue>,
        notifier: Arc<RecordingNotifier>,
    }

    fn setup(remote: FlakyRemote) -> Fixture {
        let store = Arc::new(LocalStore::new(Arc::new(MemoryStorageBackend::new())));
        let queue = Arc::new(PendingOperationQueue::new(store.clone()));
        let remote = Arc::new(remote);
        let notifier = Arc::new(RecordingNotifier::default());
        let service = MeasurementSyncService::new(
            remote.clone(),
            store.clone(),
            queue.clone(),
            notifier.clone(),
        );
        Fixture {
            service,
            remote,
            store,
            queue,
            notifier,
        }
    }

    #[tokio::test]
    async fn successful_save_caches_without_queueing() {
        let fx = setup(FlakyRemote::default());
        let measurement = Measurement::new("Suit").with_id("m-1").with_value("chest", 40.0);

        let outcome = fx.service.save(measurement.clone()).await;

        assert_eq!(outcome, SaveOutcome::Synced);
        assert_eq!(fx.service.cached().await, vec![measurement]);
        assert!(fx.queue.is_empty().await);
        assert!(fx.notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_save_caches_and_enqueues() {
        let fx = setup(FlakyRemote::failing());
        let measurement = Measurement::new("Quick").with_value("waist", 28.0);

        let outcome = fx.service.save(measurement.clone()).await;

        let SaveOutcome::Deferred { operation_id } = outcome else {
            panic!("expected deferred save");
        };
        let snapshot: Vec<Measurement> = fx.store.load(StorageKey::MeasurementSnapshot).await;
        assert_eq!(snapshot, vec![measurement.clone()]);

        let pending = fx.queue.list_all().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, operation_id);
        assert_eq!(pending[0].operation_type, PendingOperationType::MeasurementSave);
        assert_eq!(pending[0].data.to_entity::<Measurement>().unwrap(), measurement);
        assert_eq!(
            *fx.notifier.messages.lock().unwrap(),
            vec![SAVED_OFFLINE_MESSAGE.to_string()]
        );

        let loaded = fx.service.load().await;
        assert_eq!(loaded, vec![measurement]);
    }

    #[tokio::test]
    async fn load_refreshes_snapshot_from_remote() {
        let fx = setup(FlakyRemote::default());
        fx.store
            .save(
                StorageKey::MeasurementSnapshot,
                &vec![Measurement::new("Stale").with_id("old")],
            )
            .await;
        fx.remote
            .rows
            .lock()
            .unwrap()
            .push(Measurement::new("Fresh").with_id("new"));

        let loaded = fx.service.load().await;

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Fresh");
        assert_eq!(fx.service.cached().await, loaded);
        assert!(fx.store.last_sync().await.is_some());
    }

    #[tokio::test]
    async fn load_without_remote_or_cache_is_empty() {
        let fx = setup(FlakyRemote::failing());
        assert!(fx.service.load().await.is_empty());
    }

    #[tokio::test]
    async fn offline_executor_defers_without_touching_remote() {
        let store = Arc::new(LocalStore::new(Arc::new(MemoryStorageBackend::new())));
        let queue = Arc::new(PendingOperationQueue::new(store.clone()));
        let remote = Arc::new(FlakyRemote::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let executor = Arc::new(NetworkAwareExecutor::new(Arc::new(Offline), notifier.clone()));
        let service = MeasurementSyncService::new(
            remote.clone(),
            store.clone(),
            queue.clone(),
            notifier.clone(),
        )
        .with_executor(
            executor,
            NetworkConfig {
                retry_count: 2,
                retry_delay_ms: 10,
            },
        );

        let outcome = service.save(Measurement::new("Travel")).await;

        assert!(!outcome.is_synced());
        assert_eq!(remote.creates.load(Ordering::SeqCst), 0);
        assert_eq!(queue.len().await, 1);
        // オフライン通知のみ 1 回
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
    }
}
