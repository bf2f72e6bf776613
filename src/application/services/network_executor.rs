use crate::application::ports::connectivity::ConnectivitySignal;
use crate::application::ports::notifier::{Notifier, Severity};
use crate::shared::config::NetworkConfig;
use crate::shared::error::AppError;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const OFFLINE_MESSAGE: &str = "No internet connection. Changes will be saved locally.";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
pub const DEFAULT_ERROR_MESSAGE: &str = "Operation failed. Please try again.";

type SuccessCallback<T> = Box<dyn FnOnce(&T) + Send>;
type ErrorCallback = Box<dyn FnOnce(&AppError) + Send>;

pub struct ExecuteOptions<T> {
    /// 初回に加えて行う再試行回数
    pub retry_count: u32,
    /// 線形バックオフの基準値（n 回目の失敗後に `retry_delay * n` 待つ）
    pub retry_delay: Duration,
    pub show_success_toast: bool,
    pub show_error_toast: bool,
    pub show_offline_toast: bool,
    pub success_message: String,
    pub error_message: String,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for ExecuteOptions<T> {
    fn default() -> Self {
        Self {
            retry_count: 0,
            retry_delay: Duration::from_millis(1_000),
            show_success_toast: false,
            show_error_toast: true,
            show_offline_toast: true,
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> ExecuteOptions<T> {
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            ..Self::default()
        }
    }

    pub fn retries(mut self, retry_count: u32, retry_delay: Duration) -> Self {
        self.retry_count = retry_count;
        self.retry_delay = retry_delay;
        self
    }

    pub fn success_toast(mut self, message: impl Into<String>) -> Self {
        self.show_success_toast = true;
        self.success_message = message.into();
        self
    }

    pub fn error_toast(mut self, message: impl Into<String>) -> Self {
        self.show_error_toast = true;
        self.error_message = message.into();
        self
    }

    pub fn silent_errors(mut self) -> Self {
        self.show_error_toast = false;
        self
    }

    /// バックグラウンド処理向け。オフライン時も通知しない。
    pub fn silent_offline(mut self) -> Self {
        self.show_offline_toast = false;
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(&T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&AppError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

/// 接続状態を確認し、線形バックオフで再試行しながら非同期処理を実行する。
///
/// 対象の処理が何であるか（カート・採寸・注文）には関知しない。
pub struct NetworkAwareExecutor {
    connectivity: Arc<dyn ConnectivitySignal>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicUsize,
}

impl NetworkAwareExecutor {
    pub fn new(connectivity: Arc<dyn ConnectivitySignal>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            connectivity,
            notifier,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.state().is_online()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn execute<T, F, Fut>(
        &self,
        mut operation: F,
        options: ExecuteOptions<T>,
    ) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let state = self.connectivity.state();
        if !state.is_online() {
            tracing::info!(
                target: "offline::network",
                is_connected = state.is_connected,
                is_internet_reachable = ?state.is_internet_reachable,
                "skipping operation while offline"
            );
            if options.show_offline_toast {
                self.notifier.notify(OFFLINE_MESSAGE, Severity::Warning, None);
            }
            return Err(AppError::Offline);
        }

        let attempts = options.retry_count.saturating_add(1);
        let outcome = {
            let _busy = BusyGuard::enter(&self.in_flight);
            let mut last_error = None;
            let mut succeeded = None;

            for attempt in 0..attempts {
                match operation().await {
                    Ok(value) => {
                        if attempt > 0 {
                            tracing::info!(
                                target: "offline::network",
                                attempt = attempt + 1,
                                "operation succeeded after retry"
                            );
                        }
                        succeeded = Some(value);
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "offline::network",
                            attempt = attempt + 1,
                            attempts,
                            error = %err,
                            "operation attempt failed"
                        );
                        last_error = Some(err);

                        if attempt + 1 < attempts {
                            tokio::time::sleep(backoff_delay(options.retry_delay, attempt)).await;
                        }
                    }
                }
            }

            match succeeded {
                Some(value) => Ok(value),
                None => Err(last_error
                    .unwrap_or_else(|| AppError::Internal("operation was not attempted".into()))),
            }
        };

        match outcome {
            Ok(value) => {
                if options.show_success_toast {
                    self.notifier
                        .notify(&options.success_message, Severity::Success, None);
                }
                if let Some(callback) = options.on_success {
                    callback(&value);
                }
                Ok(value)
            }
            Err(error) => {
                if options.show_error_toast {
                    self.notifier
                        .notify(&options.error_message, Severity::Error, None);
                }
                if let Some(callback) = options.on_error {
                    callback(&error);
                }
                Err(error)
            }
        }
    }
}

/// `attempt` 回目（0 始まり）の失敗後に待つ時間。桁あふれは `Duration::MAX` に丸める。
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(attempt.saturating_add(1))
        .unwrap_or(Duration::MAX)
}

struct BusyGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
