use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::domain::{
    AssignmentId, AssignmentRequest, AssignmentTimeout, Notification, Notifier, OrderItem,
    OrderSummary, PushChannel, PushEvent, Subscription,
};

pub(crate) fn order(order_number: &str, table_number: u32) -> OrderSummary {
    OrderSummary {
        table_number,
        order_number: order_number.to_string(),
        items: vec![OrderItem {
            name: "Flat white".to_string(),
            quantity: 2,
        }],
    }
}

// Request with order number `ORD-<id>` at table 7, first of two candidates.
pub(crate) fn request(id: &str, timeout_secs: u64) -> AssignmentRequest {
    AssignmentRequest {
        assignment_id: AssignmentId::from(id),
        order: order(&format!("ORD-{id}"), 7),
        timeout: Duration::from_secs(timeout_secs),
        position: 1,
        total_waiters: 2,
    }
}

pub(crate) fn timeout_event(id: &str) -> AssignmentTimeout {
    AssignmentTimeout {
        assignment_id: AssignmentId::from(id),
        order_number: format!("ORD-{id}"),
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    // Shared log lets tests inspect what the controller surfaced.
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn recorded(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("notifications mutex poisoned")
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .expect("notifications mutex poisoned")
            .push(notification);
    }
}

// In-memory push channel; tests fire events straight into the broadcast sender.
pub(crate) struct InMemoryPushChannel {
    pub(crate) events_tx: broadcast::Sender<PushEvent>,
    pub(crate) connected_tx: watch::Sender<bool>,
}

impl InMemoryPushChannel {
    pub(crate) fn new(connected: bool) -> Self {
        let (events_tx, _) = broadcast::channel(16);
        let (connected_tx, _) = watch::channel(connected);
        Self {
            events_tx,
            connected_tx,
        }
    }

    pub(crate) fn push(&self, event: impl Into<PushEvent>) {
        self.events_tx
            .send(event.into())
            .expect("expected a subscriber");
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.events_tx.receiver_count()
    }
}

impl PushChannel for InMemoryPushChannel {
    fn subscribe_events(&self) -> Subscription<PushEvent> {
        Subscription::new(self.events_tx.subscribe())
    }

    fn connection_state(&self) -> watch::Receiver<bool> {
        self.connected_tx.subscribe()
    }
}
