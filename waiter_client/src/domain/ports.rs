use async_trait::async_trait;
use std::fmt;
use tokio::sync::{broadcast, watch};
use tracing::warn;

use crate::domain::notification::Notification;
use crate::domain::offer::{AssignmentId, AssignmentRequest, AssignmentTimeout, PushEvent};

// Tokio channel types in the domain are a dependency leak, but a pragmatic one:
// every adapter and the session loop already speak them.

/// Scoped subscription to the push channel. Dropping it unsubscribes.
///
/// Every subscription reads the same ordered event stream; typed ones skip
/// events of the other kind.
#[derive(Debug)]
pub struct Subscription<T> {
    topic: &'static str,
    rx: broadcast::Receiver<PushEvent>,
    select: fn(PushEvent) -> Option<T>,
}

impl Subscription<PushEvent> {
    pub fn new(rx: broadcast::Receiver<PushEvent>) -> Self {
        Self {
            topic: "push-event",
            rx,
            select: Some,
        }
    }

    /// Narrows to one kind of event on the same underlying receiver.
    pub fn narrow<U>(
        self,
        topic: &'static str,
        select: fn(PushEvent) -> Option<U>,
    ) -> Subscription<U> {
        Subscription {
            topic,
            rx: self.rx,
            select,
        }
    }
}

impl<T> Subscription<T> {
    /// Waits for the next matching event. Returns `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if let Some(event) = (self.select)(event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // Missed offers come back through the reconnect re-push.
                    warn!(topic = self.topic, missed, "subscription lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// The session depends on this trait, not on a concrete socket, so tests can
// inject an in-memory channel.
pub trait PushChannel: Send + Sync {
    /// Requests and timeouts interleaved in delivery order.
    fn subscribe_events(&self) -> Subscription<PushEvent>;

    fn subscribe_assignment_requests(&self) -> Subscription<AssignmentRequest> {
        self.subscribe_events()
            .narrow("assignment-request", PushEvent::into_request)
    }

    fn subscribe_assignment_timeouts(&self) -> Subscription<AssignmentTimeout> {
        self.subscribe_events()
            .narrow("assignment-timeout", PushEvent::into_timeout)
    }

    /// Current connection flag; changes whenever the transport connects or drops.
    fn connection_state(&self) -> watch::Receiver<bool>;
}

// Port for surfacing notifications. Emission is fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

#[derive(Debug)]
pub enum DecisionError {
    Transport(String),
    Rejected { status: u16, message: Option<String> },
    Decode(String),
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionError::Transport(err) => write!(f, "dispatch transport error: {err}"),
            DecisionError::Rejected { status, message } => {
                if let Some(message) = message {
                    write!(f, "dispatch rejected decision {status}: {message}")
                } else {
                    write!(f, "dispatch rejected decision {status}")
                }
            }
            DecisionError::Decode(err) => write!(f, "dispatch response decode error: {err}"),
        }
    }
}

impl std::error::Error for DecisionError {}

// Port for reporting the waiter's decisions back to the dispatch server.
#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn accept(&self, assignment_id: &AssignmentId) -> Result<(), DecisionError>;
    async fn pass(&self, assignment_id: &AssignmentId) -> Result<(), DecisionError>;
}
