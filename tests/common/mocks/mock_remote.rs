use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tailor_offline::application::ports::RemoteEntityService;
use tailor_offline::AppError;
use tokio::sync::RwLock;

/// `create` を指定回数だけ失敗させるリモート
#[derive(Debug)]
pub struct MockRemoteService<E> {
    failures_left: AtomicU32,
    create_calls: AtomicU32,
    list_fails: bool,
    rows: Arc<RwLock<Vec<E>>>,
}

impl<E: Clone + Send + Sync + 'static> MockRemoteService<E> {
    pub fn healthy() -> Arc<Self> {
        Self::failing_times(0)
    }

    pub fn failing_times(times: u32) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicU32::new(times),
            create_calls: AtomicU32::new(0),
            list_fails: false,
            rows: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub fn always_failing() -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicU32::new(u32::MAX),
            create_calls: AtomicU32::new(0),
            list_fails: true,
            rows: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub fn recover(&self) {
        self.failures_left.store(0, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Vec<E> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> RemoteEntityService<E> for MockRemoteService<E> {
    async fn create(&self, entity: &E) -> Result<(), AppError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            if left != u32::MAX {
                self.failures_left.store(left - 1, Ordering::SeqCst);
            }
            return Err(AppError::Remote("service unavailable".into()));
        }
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<E>, AppError> {
        if self.list_fails {
            return Err(AppError::Remote("service unavailable".into()));
        }
        Ok(self.rows.read().await.clone())
    }
}
