use std::sync::{Arc, Mutex};
use tailor_offline::application::ports::{NotificationAction, Notifier, Severity};

#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    messages: Arc<Mutex<Vec<(String, Severity)>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(text, _)| text == message)
            .count()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, message: &str, severity: Severity, _action: Option<NotificationAction>) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}
