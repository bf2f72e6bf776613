use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrainOutcomeStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainMetricsSnapshot {
    pub total_success: u64,
    pub total_failure: u64,
    pub total_evicted: u64,
    pub consecutive_failure: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
    pub last_outcome: Option<DrainOutcomeStatus>,
    pub last_trigger: Option<String>,
    pub last_replayed: Option<u32>,
    pub last_failed: Option<u32>,
    pub last_remaining: Option<usize>,
    pub last_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainOutcomeMetadata {
    pub trigger: Option<String>,
    pub replayed: Option<u32>,
    pub failed: Option<u32>,
    pub evicted: Option<u32>,
    pub remaining: Option<usize>,
    pub duration_ms: Option<u64>,
}

#[derive(Default, Clone)]
struct LastDrainMetadata {
    last_outcome: Option<DrainOutcomeStatus>,
    trigger: Option<String>,
    replayed: Option<u32>,
    failed: Option<u32>,
    remaining: Option<usize>,
    duration_ms: Option<u64>,
}

struct OfflineDrainMetrics {
    success: AtomicU64,
    failure: AtomicU64,
    evicted: AtomicU64,
    consecutive_failure: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
    metadata: Mutex<LastDrainMetadata>,
}

impl OfflineDrainMetrics {
    fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            consecutive_failure: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            metadata: Mutex::new(LastDrainMetadata::default()),
        }
    }

    fn record(&self, status: DrainOutcomeStatus, meta: &DrainOutcomeMetadata) {
        match status {
            DrainOutcomeStatus::Success => {
                self.success.fetch_add(1, Ordering::Relaxed);
                self.last_success_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failure.store(0, Ordering::Relaxed);
            }
            DrainOutcomeStatus::Failure => {
                self.failure.fetch_add(1, Ordering::Relaxed);
                self.last_failure_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failure.fetch_add(1, Ordering::Relaxed);
            }
        }
        if let Some(evicted) = meta.evicted {
            self.evicted.fetch_add(u64::from(evicted), Ordering::Relaxed);
        }

        if let Ok(mut guard) = self.metadata.lock() {
            guard.last_outcome = Some(status);
            guard.trigger = meta.trigger.clone();
            guard.replayed = meta.replayed;
            guard.failed = meta.failed;
            guard.remaining = meta.remaining;
            guard.duration_ms = meta.duration_ms;
        }
    }

    fn snapshot(&self) -> DrainMetricsSnapshot {
        let metadata = self
            .metadata
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();

        DrainMetricsSnapshot {
            total_success: self.success.load(Ordering::Relaxed),
            total_failure: self.failure.load(Ordering::Relaxed),
            total_evicted: self.evicted.load(Ordering::Relaxed),
            consecutive_failure: self.consecutive_failure.load(Ordering::Relaxed),
            last_success_ms: to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: to_option(self.last_failure_ms.load(Ordering::Relaxed)),
            last_outcome: metadata.last_outcome,
            last_trigger: metadata.trigger,
            last_replayed: metadata.replayed,
            last_failed: metadata.failed,
            last_remaining: metadata.remaining,
            last_duration_ms: metadata.duration_ms,
        }
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

static OFFLINE_DRAIN_METRICS: LazyLock<OfflineDrainMetrics> =
    LazyLock::new(OfflineDrainMetrics::new);

/// ドレイン 1 サイクルの結果を記録する（失敗が 1 件でもあれば Failure）
pub fn record_outcome(
    status: DrainOutcomeStatus,
    metadata: &DrainOutcomeMetadata,
) -> DrainMetricsSnapshot {
    OFFLINE_DRAIN_METRICS.record(status, metadata);
    OFFLINE_DRAIN_METRICS.snapshot()
}

pub fn snapshot() -> DrainMetricsSnapshot {
    OFFLINE_DRAIN_METRICS.snapshot()
}
