use crate::application::ports::connectivity::ConnectivitySignal;
use crate::application::ports::replay_handler::ReplayHandler;
use crate::application::services::local_store::LocalStore;
use crate::application::services::pending_queue::PendingOperationQueue;
use crate::domain::entities::offline::{DrainReport, PendingOperationPatch};
use crate::domain::value_objects::PendingOperationType;
use crate::infrastructure::offline::metrics::{
    self, DrainOutcomeMetadata, DrainOutcomeStatus,
};
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// アウトボックスの再送とエビクションを担う。
pub struct QueueDrainer {
    queue: Arc<PendingOperationQueue>,
    store: Arc<LocalStore>,
    handlers: HashMap<PendingOperationType, Arc<dyn ReplayHandler>>,
    connectivity: Option<Arc<dyn ConnectivitySignal>>,
    max_retries: u32,
    gate: Mutex<()>,
}

impl QueueDrainer {
    pub fn new(queue: Arc<PendingOperationQueue>, store: Arc<LocalStore>) -> Self {
        Self {
            queue,
            store,
            handlers: HashMap::new(),
            connectivity: None,
            max_retries: DEFAULT_MAX_RETRIES,
            gate: Mutex::new(()),
        }
    }

    pub fn register(
        mut self,
        operation_type: PendingOperationType,
        handler: Arc<dyn ReplayHandler>,
    ) -> Self {
        self.handlers.insert(operation_type, handler);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 設定するとオフライン中の `drain` とサイクルは再送せずに終わる
    pub fn with_connectivity(mut self, connectivity: Arc<dyn ConnectivitySignal>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// 積まれた順に 1 件ずつ再送する。成功は削除、失敗は retryCount を 1 増やす。
    /// ハンドラ未登録の種別とオフラインで送れなかったものは触らずに残す。
    pub async fn drain(&self) -> DrainReport {
        let _guard = self.gate.lock().await;
        if self.is_offline() {
            return self.offline_report("drain").await;
        }
        self.drain_unguarded().await
    }

    /// `retryCount >= max_retries` のエントリを再送せずに捨て、件数を返す
    pub async fn cleanup(&self, max_retries: u32) -> usize {
        let evicted = self.queue.remove_exhausted(max_retries).await;
        for operation in &evicted {
            tracing::warn!(
                target: "offline::drain",
                id = %operation.id,
                operation_type = %operation.operation_type,
                retry_count = operation.retry_count,
                "pending operation dropped after exhausting retries"
            );
        }
        evicted.len()
    }

    pub async fn run_cycle(&self) -> DrainReport {
        self.run_cycle_with("manual").await
    }

    /// バックグラウンドで 1 サイクル実行する
    pub fn trigger(self: &Arc<Self>) -> JoinHandle<()> {
        let drainer = Arc::clone(self);
        tokio::spawn(async move {
            drainer.run_cycle_with("trigger").await;
        })
    }

    /// `interval` ごとに `run_cycle` を回す。初回は即時。停止は呼び出し側が handle で行う。
    pub fn spawn_periodic(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let drainer = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                drainer.run_cycle_with("interval").await;
            }
        })
    }

    async fn run_cycle_with(&self, trigger: &'static str) -> DrainReport {
        let _guard = self.gate.lock().await;
        if self.is_offline() {
            return self.offline_report(trigger).await;
        }
        let started = Instant::now();

        let mut report = self.drain_unguarded().await;
        let evicted = self.cleanup(self.max_retries).await;
        report.evicted = u32::try_from(evicted).unwrap_or(u32::MAX);
        if evicted > 0 {
            report.remaining = self.queue.len().await;
        }

        if report.replayed > 0 {
            self.store.record_last_sync().await;
        }

        if report.attempted() > 0 || report.evicted > 0 {
            let status = if report.failed == 0 {
                DrainOutcomeStatus::Success
            } else {
                DrainOutcomeStatus::Failure
            };
            metrics::record_outcome(
                status,
                &DrainOutcomeMetadata {
                    trigger: Some(trigger.to_string()),
                    replayed: Some(report.replayed),
                    failed: Some(report.failed),
                    evicted: Some(report.evicted),
                    remaining: Some(report.remaining),
                    duration_ms: Some(started.elapsed().as_millis() as u64),
                },
            );
        }

        tracing::info!(
            target: "offline::drain",
            trigger,
            replayed = report.replayed,
            failed = report.failed,
            skipped = report.skipped,
            evicted = report.evicted,
            remaining = report.remaining,
            "offline drain cycle completed"
        );
        report
    }

    fn is_offline(&self) -> bool {
        self.connectivity
            .as_ref()
            .is_some_and(|connectivity| !connectivity.state().is_online())
    }

    async fn offline_report(&self, trigger: &'static str) -> DrainReport {
        let remaining = self.queue.len().await;
        tracing::debug!(
            target: "offline::drain",
            trigger,
            remaining,
            "offline, drain skipped"
        );
        DrainReport {
            skipped: u32::try_from(remaining).unwrap_or(u32::MAX),
            remaining,
            ..DrainReport::default()
        }
    }

    async fn drain_unguarded(&self) -> DrainReport {
        let mut report = DrainReport::default();
        let mut offline = false;

        for operation in self.queue.list_all().await {
            let Some(handler) = self.handlers.get(&operation.operation_type) else {
                report.skipped += 1;
                continue;
            };
            // 途中で切断されたら残りは送らない。retryCount は消費しない。
            if offline {
                report.skipped += 1;
                continue;
            }

            match handler.replay(&operation.data).await {
                Err(AppError::Offline) => {
                    offline = true;
                    report.skipped += 1;
                    tracing::debug!(
                        target: "offline::drain",
                        id = %operation.id,
                        "connection lost during drain, leaving remaining operations queued"
                    );
                }
                Ok(()) => {
                    self.queue.remove(&operation.id).await;
                    report.replayed += 1;
                    report.replayed_ids.push(operation.id.to_string());
                }
                Err(err) => {
                    let retry_count = operation.retry_count.saturating_add(1);
                    self.queue
                        .update(&operation.id, PendingOperationPatch::retry_count(retry_count))
                        .await;
                    report.failed += 1;
                    tracing::warn!(
                        target: "offline::drain",
                        id = %operation.id,
                        operation_type = %operation.operation_type,
                        retry_count,
                        error = %err,
                        "pending operation replay failed"
                    );
                }
            }
        }

        report.remaining = self.queue.len().await;
        report
    }
}
