// Assignment offers as seen by a single waiter client.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Opaque identifier issued by the dispatch server for one offer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssignmentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
}

/// Read-only snapshot of the order taken when the offer was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub table_number: u32,
    pub order_number: String,
    pub items: Vec<OrderItem>,
}

// Decoded `order:assignment-request` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub assignment_id: AssignmentId,
    pub order: OrderSummary,
    pub timeout: Duration,
    pub position: u32,
    pub total_waiters: u32,
}

// Decoded `order:assignment-timeout` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTimeout {
    pub assignment_id: AssignmentId,
    pub order_number: String,
}

/// One event from the push channel, kept in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Request(AssignmentRequest),
    Timeout(AssignmentTimeout),
}

impl PushEvent {
    pub fn assignment_id(&self) -> &AssignmentId {
        match self {
            PushEvent::Request(request) => &request.assignment_id,
            PushEvent::Timeout(timeout) => &timeout.assignment_id,
        }
    }

    pub fn into_request(self) -> Option<AssignmentRequest> {
        match self {
            PushEvent::Request(request) => Some(request),
            PushEvent::Timeout(_) => None,
        }
    }

    pub fn into_timeout(self) -> Option<AssignmentTimeout> {
        match self {
            PushEvent::Timeout(timeout) => Some(timeout),
            PushEvent::Request(_) => None,
        }
    }
}

impl From<AssignmentRequest> for PushEvent {
    fn from(request: AssignmentRequest) -> Self {
        PushEvent::Request(request)
    }
}

impl From<AssignmentTimeout> for PushEvent {
    fn from(timeout: AssignmentTimeout) -> Self {
        PushEvent::Timeout(timeout)
    }
}

/// A pending proposal that this waiter handles a specific order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOffer {
    pub assignment_id: AssignmentId,
    pub order: OrderSummary,
    pub timeout: Duration,
    pub position: u32,
    pub total_waiters: u32,
    /// Client-local receipt time. Only drives display and the local fallback deadline.
    pub received_at: Instant,
}

impl AssignmentOffer {
    pub fn from_request(request: AssignmentRequest, received_at: Instant) -> Self {
        Self {
            assignment_id: request.assignment_id,
            order: request.order,
            timeout: request.timeout,
            position: request.position,
            total_waiters: request.total_waiters,
            received_at,
        }
    }

    /// Instant after which the client gives up waiting for the server timeout.
    pub fn local_deadline(&self, grace: Duration) -> Instant {
        self.received_at + self.timeout + grace
    }
}

/// Which side observed the timeout first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutSource {
    Server,
    Local,
}

/// Terminal states of an offer. Nothing transitions out of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Accepted,
    Passed,
    TimedOut(TimeoutSource),
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Accepted => f.write_str("accepted"),
            Resolution::Passed => f.write_str("passed"),
            Resolution::TimedOut(TimeoutSource::Server) => f.write_str("timed out (server)"),
            Resolution::TimedOut(TimeoutSource::Local) => f.write_str("timed out (local)"),
        }
    }
}
