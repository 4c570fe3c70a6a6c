//! User notifications.

use parking_lot::Mutex;
use tracing::info;

use inkcheck_protocols::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// [`Notifier`] that logs and keeps every notification.
#[derive(Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.entries.lock().last().cloned()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, title: &str, message: &str) {
        info!(title, message, "Notification");
        self.entries.lock().push(Notification {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
