use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const RANDOM_SUFFIX_LEN: usize = 9;

/// 保留操作の識別子（`<epoch ms>_<ランダム英数字>`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingOperationId(String);

impl PendingOperationId {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// 端末間の調整なしで衝突しない ID を生成する
    pub fn generate() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_SUFFIX_LEN)
            .map(char::from)
            .collect::<String>()
            .to_ascii_lowercase();
        Self(format!("{}_{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Pending operation id cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for PendingOperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PendingOperationId> for String {
    fn from(id: PendingOperationId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_have_timestamp_and_suffix() {
        let id = PendingOperationId::generate();
        let (millis, suffix) = id.as_str().split_once('_').expect("separator");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
    }

    #[test]
    fn generated_ids_do_not_collide_within_same_millisecond() {
        let ids: HashSet<_> = (0..500).map(|_| PendingOperationId::generate()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn rejects_blank_id() {
        assert!(PendingOperationId::new("   ".into()).is_err());
    }
}
