use crate::domain::{Notification, NotificationLevel, Notifier};
use tokio::sync::mpsc;
use tracing::{info, warn};

// Logs every notification; used when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let message = notification.message();
        match notification.level() {
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(?notification, "{message}")
            }
            NotificationLevel::Warning => warn!(?notification, "{message}"),
        }
    }
}

// Forwards notifications to the presentation layer without blocking the session.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<Notification>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(notification)) => {
                warn!(?notification, "notification channel full; dropping toast");
            }
            // UI already gone during shutdown.
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
