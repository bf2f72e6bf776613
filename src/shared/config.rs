use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    #[default]
    File,
    Sqlite,
    Memory,
}

impl StorageBackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" | "fs" => Some(Self::File),
            "sqlite" | "db" => Some(Self::Sqlite),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// 線形バックオフの基準値の上限（10 分）
pub const MAX_RETRY_DELAY_MS: u64 = 600_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    /// `None` の場合はプラットフォームのローカルデータディレクトリを使う
    pub data_dir: Option<String>,
    pub database_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub max_retry: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub retry_count: u32,
    pub retry_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackendKind::File,
                data_dir: None,
                database_url: default_database_url(),
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                max_retry: 3,
            },
            network: NetworkConfig {
                retry_count: 0,
                retry_delay_ms: 1_000,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TAILOR_STORAGE_BACKEND") {
            if let Some(kind) = StorageBackendKind::parse(&v) {
                cfg.storage.backend = kind;
            }
        }
        if let Ok(v) = std::env::var("TAILOR_DATA_DIR") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.storage.data_dir = Some(trimmed.to_string());
            }
        }
        if let Ok(v) = std::env::var("TAILOR_DATABASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.storage.database_url = trimmed.to_string();
            }
        }

        if let Ok(v) = std::env::var("TAILOR_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("TAILOR_SYNC_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("TAILOR_MAX_RETRY") {
            if let Some(value) = parse_u32(&v) {
                cfg.sync.max_retry = value;
            }
        }

        if let Ok(v) = std::env::var("TAILOR_RETRY_COUNT") {
            if let Some(value) = parse_u32(&v) {
                cfg.network.retry_count = value;
            }
        }
        if let Ok(v) = std::env::var("TAILOR_RETRY_DELAY_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.network.retry_delay_ms = value;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sync.max_retry == 0 {
            return Err("Sync max_retry must be greater than 0".to_string());
        }
        if self.sync.auto_sync && self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        if self.network.retry_delay_ms > MAX_RETRY_DELAY_MS {
            return Err(format!(
                "Network retry_delay_ms must be at most {MAX_RETRY_DELAY_MS}"
            ));
        }
        if self.storage.backend == StorageBackendKind::Sqlite
            && self.storage.database_url.trim().is_empty()
        {
            return Err("Storage database_url is required for the sqlite backend".to_string());
        }
        Ok(())
    }
}

/// ファイルバックエンドと同じくプラットフォームのローカルデータディレクトリに置く
fn default_database_url() -> String {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tailor-offline");
    path.push("tailor_offline.db");
    format!("sqlite://{}", path.display())
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
