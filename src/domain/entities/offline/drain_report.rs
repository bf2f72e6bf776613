use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub replayed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub evicted: u32,
    pub remaining: usize,
    pub replayed_ids: Vec<String>,
}

impl DrainReport {
    pub fn attempted(&self) -> u32 {
        self.replayed + self.failed
    }
}
