use crate::application::ports::remote_service::RemoteEntityService;
use crate::application::ports::replay_handler::ReplayHandler;
use crate::application::services::network_executor::{ExecuteOptions, NetworkAwareExecutor};
use crate::domain::value_objects::OfflinePayload;
use crate::shared::config::NetworkConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

/// ペイロードをエンティティへ戻してリモートの `create` に渡すハンドラ
pub struct EntityReplayHandler<E: Send + Sync + 'static> {
    remote: Arc<dyn RemoteEntityService<E>>,
    executor: Option<(Arc<NetworkAwareExecutor>, NetworkConfig)>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> EntityReplayHandler<E>
where
    E: Send + Sync + 'static,
{
    pub fn new(remote: Arc<dyn RemoteEntityService<E>>) -> Self {
        Self {
            remote,
            executor: None,
            _entity: PhantomData,
        }
    }

    /// 再送 1 回の中で `NetworkConfig` に従った再試行を行う
    pub fn with_executor(
        mut self,
        executor: Arc<NetworkAwareExecutor>,
        config: NetworkConfig,
    ) -> Self {
        self.executor = Some((executor, config));
        self
    }
}

#[async_trait]
impl<E> ReplayHandler for EntityReplayHandler<E>
where
    E: DeserializeOwned + Send + Sync + 'static,
{
    async fn replay(&self, payload: &OfflinePayload) -> Result<(), AppError> {
        // 形の合わないペイロードは成功しえないが、上限到達まで他の失敗と同様に扱う
        let entity: E = payload.to_entity().map_err(AppError::DeserializationError)?;
        match &self.executor {
            Some((executor, config)) => {
                let remote = &self.remote;
                executor
                    .execute(
                        || remote.create(&entity),
                        ExecuteOptions::from_config(config)
                            .silent_errors()
                            .silent_offline(),
                    )
                    .await
            }
            None => self.remote.create(&entity).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OrderSubmission;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOrders {
        created: Mutex<Vec<OrderSubmission>>,
    }

    #[async_trait]
    impl RemoteEntityService<OrderSubmission> for RecordingOrders {
        async fn create(&self, entity: &OrderSubmission) -> Result<(), AppError> {
            self.created.lock().unwrap().push(entity.clone());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<OrderSubmission>, AppError> {
            Ok(self.created.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn replays_payload_as_entity() {
        let remote = Arc::new(RecordingOrders::default());
        let handler = EntityReplayHandler::<OrderSubmission>::new(remote.clone());
        let payload = OfflinePayload::new(json!({
            "items": [{"productId": "blazer", "quantity": 1, "price": 120.0}],
            "totalAmount": 120.0
        }))
        .unwrap();

        handler.replay(&payload).await.unwrap();

        let created = remote.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].items[0].product_id, "blazer");
    }

    #[tokio::test]
    async fn malformed_payload_fails_without_remote_call() {
        let remote = Arc::new(RecordingOrders::default());
        let handler = EntityReplayHandler::<OrderSubmission>::new(remote.clone());
        let payload = OfflinePayload::new(json!({"unexpected": true})).unwrap();

        let err = handler.replay(&payload).await.unwrap_err();

        assert!(matches!(err, AppError::DeserializationError(_)));
        assert!(remote.created.lock().unwrap().is_empty());
    }
}
