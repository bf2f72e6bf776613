use std::sync::Arc;

use super::mocks::{MockConnectivity, MockNotifier, MockRemoteService};
use tailor_offline::application::ports::{ConnectivitySignal, Notifier, StorageBackend};
use tailor_offline::application::services::{
    EntityReplayHandler, LocalStore, MeasurementSyncService, NetworkAwareExecutor,
    PendingOperationQueue, QueueDrainer,
};
use tailor_offline::domain::entities::Measurement;
use tailor_offline::domain::value_objects::PendingOperationType;
use tailor_offline::infrastructure::storage::MemoryStorageBackend;
use tailor_offline::shared::config::NetworkConfig;

pub struct MeasurementTestContext {
    pub backend: MemoryStorageBackend,
    pub store: Arc<LocalStore>,
    pub queue: Arc<PendingOperationQueue>,
    pub service: MeasurementSyncService,
    pub drainer: QueueDrainer,
    pub remote: Arc<MockRemoteService<Measurement>>,
    pub notifier: MockNotifier,
    pub connectivity: MockConnectivity,
}

/// `retry_count` 回の再試行付きで測定値の同期一式を組み立てる
pub fn setup_measurement_sync(
    remote: Arc<MockRemoteService<Measurement>>,
    retry_count: u32,
) -> MeasurementTestContext {
    let backend = MemoryStorageBackend::new();
    let store = Arc::new(LocalStore::new(
        Arc::new(backend.clone()) as Arc<dyn StorageBackend>
    ));
    let queue = Arc::new(PendingOperationQueue::new(store.clone()));
    let notifier = MockNotifier::new();
    let connectivity = MockConnectivity::online();
    let network = NetworkConfig {
        retry_count,
        retry_delay_ms: 10,
    };
    let executor = Arc::new(NetworkAwareExecutor::new(
        Arc::new(connectivity.clone()) as Arc<dyn ConnectivitySignal>,
        Arc::new(notifier.clone()) as Arc<dyn Notifier>,
    ));

    let service = MeasurementSyncService::new(
        remote.clone(),
        store.clone(),
        queue.clone(),
        Arc::new(notifier.clone()),
    )
    .with_executor(executor.clone(), network.clone());

    let drainer = QueueDrainer::new(queue.clone(), store.clone()).register(
        PendingOperationType::MeasurementSave,
        Arc::new(
            EntityReplayHandler::<Measurement>::new(remote.clone()).with_executor(executor, network),
        ),
    );

    MeasurementTestContext {
        backend,
        store,
        queue,
        service,
        drainer,
        remote,
        notifier,
        connectivity,
    }
}
