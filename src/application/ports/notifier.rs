use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    pub action_id: String,
}

/// トースト/アラートの表示先。戻り値は使わない。
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity, action: Option<NotificationAction>);
}
