use crate::application::ports::{
    ConnectivitySignal, Notifier, RemoteEntityService, ReplayHandler, Severity, StorageBackend,
};
use crate::application::services::network_executor::{ExecuteOptions, NetworkAwareExecutor};
use crate::application::services::snapshot_sync::SAVED_OFFLINE_MESSAGE;
use crate::application::services::{
    CartSyncService, EntityReplayHandler, LocalStore, MeasurementSyncService,
    PendingOperationQueue, QueueDrainer, SaveOutcome,
};
use crate::domain::entities::{CartEntry, DrainReport, Measurement, OrderSubmission};
use crate::domain::value_objects::{OfflinePayload, PendingOperationType};
use crate::infrastructure::offline::metrics::{self, DrainMetricsSnapshot};
use crate::infrastructure::storage::{
    FileStorageBackend, MemoryStorageBackend, SqliteStorageBackend,
};
use crate::shared::config::{AppConfig, StorageBackendKind};
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// リモート側の実装一式
#[derive(Clone)]
pub struct RemoteServices {
    pub measurements: Arc<dyn RemoteEntityService<Measurement>>,
    pub cart: Arc<dyn RemoteEntityService<CartEntry>>,
    pub orders: Arc<dyn RemoteEntityService<OrderSubmission>>,
}

/// オフライン同期まわりの状態をまとめて保持する
pub struct OfflineState {
    pub config: AppConfig,
    pub store: Arc<LocalStore>,
    pub queue: Arc<PendingOperationQueue>,
    pub executor: Arc<NetworkAwareExecutor>,
    pub measurements: Arc<MeasurementSyncService>,
    pub cart: Arc<CartSyncService>,
    pub drainer: Arc<QueueDrainer>,
    orders: Arc<dyn RemoteEntityService<OrderSubmission>>,
    notifier: Arc<dyn Notifier>,
    periodic: Mutex<Option<JoinHandle<()>>>,
}

impl OfflineState {
    pub async fn initialize(
        config: AppConfig,
        remotes: RemoteServices,
        connectivity: Arc<dyn ConnectivitySignal>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let backend = Self::build_backend(&config).await?;
        let state = Self::with_backend(config, backend, remotes, connectivity, notifier);

        if state.config.sync.auto_sync {
            state
                .start_auto_sync(Duration::from_secs(state.config.sync.sync_interval))
                .await;
        }

        tracing::info!(
            target: "offline::state",
            backend = ?state.config.storage.backend,
            auto_sync = state.config.sync.auto_sync,
            "offline state initialized"
        );
        Ok(state)
    }

    /// バックエンドを差し込んで組み立てる。自動同期は開始しない。
    pub fn with_backend(
        config: AppConfig,
        backend: Arc<dyn StorageBackend>,
        remotes: RemoteServices,
        connectivity: Arc<dyn ConnectivitySignal>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = Arc::new(LocalStore::new(backend));
        let queue = Arc::new(PendingOperationQueue::new(store.clone()));
        let executor = Arc::new(NetworkAwareExecutor::new(
            connectivity.clone(),
            notifier.clone(),
        ));

        let measurements = Arc::new(
            MeasurementSyncService::new(
                remotes.measurements.clone(),
                store.clone(),
                queue.clone(),
                notifier.clone(),
            )
            .with_executor(executor.clone(), config.network.clone()),
        );
        let cart = Arc::new(
            CartSyncService::new(
                remotes.cart.clone(),
                store.clone(),
                queue.clone(),
                notifier.clone(),
            )
            .with_executor(executor.clone(), config.network.clone()),
        );

        let drainer = Arc::new(
            QueueDrainer::new(queue.clone(), store.clone())
                .register(
                    PendingOperationType::MeasurementSave,
                    replay_handler(remotes.measurements, &executor, &config),
                )
                .register(
                    PendingOperationType::CartSync,
                    replay_handler(remotes.cart, &executor, &config),
                )
                .register(
                    PendingOperationType::OrderSubmit,
                    replay_handler(remotes.orders.clone(), &executor, &config),
                )
                .with_max_retries(config.sync.max_retry)
                .with_connectivity(connectivity),
        );

        Self {
            config,
            store,
            queue,
            executor,
            measurements,
            cart,
            drainer,
            orders: remotes.orders,
            notifier,
            periodic: Mutex::new(None),
        }
    }

    async fn build_backend(config: &AppConfig) -> Result<Arc<dyn StorageBackend>, AppError> {
        let backend: Arc<dyn StorageBackend> = match config.storage.backend {
            StorageBackendKind::File => match &config.storage.data_dir {
                Some(dir) => Arc::new(FileStorageBackend::new(dir)),
                None => Arc::new(FileStorageBackend::default_location()),
            },
            StorageBackendKind::Sqlite => {
                Arc::new(SqliteStorageBackend::connect(&config.storage.database_url).await?)
            }
            StorageBackendKind::Memory => Arc::new(MemoryStorageBackend::new()),
        };
        Ok(backend)
    }

    /// 注文を送信する。送れなければアウトボックスに積む（ローカルスナップショットは持たない）。
    pub async fn submit_order(&self, order: OrderSubmission) -> Result<SaveOutcome, AppError> {
        let orders = &self.orders;
        let result = self
            .executor
            .execute(
                || orders.create(&order),
                ExecuteOptions::from_config(&self.config.network).silent_errors(),
            )
            .await;

        match result {
            Ok(()) => Ok(SaveOutcome::Synced),
            Err(err) => {
                let payload = OfflinePayload::from_entity(&order)
                    .map_err(AppError::SerializationError)?;
                let operation_id = self
                    .queue
                    .enqueue(PendingOperationType::OrderSubmit, payload)
                    .await;
                tracing::warn!(
                    target: "offline::sync",
                    id = %operation_id,
                    error = %err,
                    "order submission deferred to outbox"
                );
                if !matches!(err, AppError::Offline) {
                    self.notifier
                        .notify(SAVED_OFFLINE_MESSAGE, Severity::Info, None);
                }
                Ok(SaveOutcome::Deferred { operation_id })
            }
        }
    }

    /// オンラインなら即座に 1 サイクル回す
    pub async fn sync_now(&self) -> Result<DrainReport, AppError> {
        if !self.executor.is_online() {
            return Err(AppError::Offline);
        }
        Ok(self.drainer.run_cycle().await)
    }

    /// 接続が戻ったときに呼ぶ
    pub fn on_reconnected(&self) -> JoinHandle<()> {
        self.drainer.trigger()
    }

    pub async fn start_auto_sync(&self, interval: Duration) {
        let mut periodic = self.periodic.lock().await;
        if let Some(handle) = periodic.take() {
            handle.abort();
        }
        *periodic = Some(self.drainer.spawn_periodic(interval));
    }

    pub async fn stop_auto_sync(&self) {
        if let Some(handle) = self.periodic.lock().await.take() {
            handle.abort();
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.queue.len().await
    }

    /// ドレインの累積カウンタ。プロセス全体で共有される。
    pub fn drain_metrics(&self) -> DrainMetricsSnapshot {
        metrics::snapshot()
    }

    /// ログアウト時に全オフラインデータを消す
    pub async fn logout(&self) {
        self.stop_auto_sync().await;
        self.store.clear_all().await;
        tracing::info!(target: "offline::state", "offline data cleared");
    }
}

fn replay_handler<E>(
    remote: Arc<dyn RemoteEntityService<E>>,
    executor: &Arc<NetworkAwareExecutor>,
    config: &AppConfig,
) -> Arc<dyn ReplayHandler>
where
    E: serde::de::DeserializeOwned + Send + Sync + 'static,
{
    Arc::new(EntityReplayHandler::new(remote).with_executor(executor.clone(), config.network.clone()))
}
