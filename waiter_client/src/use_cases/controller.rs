// Bridges push-channel events and user decisions onto the pending queue.

use crate::domain::{
    AssignmentId, AssignmentOffer, AssignmentQueue, AssignmentRequest, AssignmentTimeout,
    EnqueueOutcome, Notification, Notifier, OrderSummary, Resolution, TimeoutSource,
};
use crate::use_cases::types::AssignmentSnapshot;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// How many resolved ids are remembered to reject late re-deliveries.
pub const DEFAULT_RESOLVED_MEMORY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Activated,
    Queued { position: usize },
    // Same id already pending.
    Duplicate,
    // Same id was accepted, passed or timed out earlier; terminal states stay terminal.
    AlreadyResolved,
}

impl From<EnqueueOutcome> for RequestOutcome {
    fn from(outcome: EnqueueOutcome) -> Self {
        match outcome {
            EnqueueOutcome::Activated => RequestOutcome::Activated,
            EnqueueOutcome::Queued { position } => RequestOutcome::Queued { position },
            EnqueueOutcome::Duplicate => RequestOutcome::Duplicate,
        }
    }
}

/// Owns the local queue for one waiter.
///
/// Every removal path (accept, pass, server timeout, local timeout) funnels
/// through `resolve`, so a second removal of the same id is always a no-op.
/// There is no locking: the session loop is the only caller.
pub struct AssignmentController<N> {
    queue: AssignmentQueue,
    notifier: N,
    connected: bool,
    resolved: VecDeque<AssignmentId>,
    resolved_capacity: usize,
}

impl<N: Notifier> AssignmentController<N> {
    pub fn new(notifier: N) -> Self {
        Self::with_resolved_memory(notifier, DEFAULT_RESOLVED_MEMORY)
    }

    pub fn with_resolved_memory(notifier: N, resolved_capacity: usize) -> Self {
        Self {
            queue: AssignmentQueue::new(),
            notifier,
            connected: false,
            resolved: VecDeque::with_capacity(resolved_capacity),
            resolved_capacity,
        }
    }

    pub fn on_assignment_request(
        &mut self,
        request: AssignmentRequest,
        received_at: Instant,
    ) -> RequestOutcome {
        if self.resolved.contains(&request.assignment_id) {
            debug!(assignment_id = %request.assignment_id, "request for resolved assignment ignored");
            return RequestOutcome::AlreadyResolved;
        }

        let offer = AssignmentOffer::from_request(request, received_at);
        let notification = Notification::NewAssignment {
            assignment_id: offer.assignment_id.clone(),
            table_number: offer.order.table_number,
            order_number: offer.order.order_number.clone(),
            position: offer.position,
            total_waiters: offer.total_waiters,
        };
        let assignment_id = offer.assignment_id.clone();

        let outcome = RequestOutcome::from(self.queue.enqueue(offer));
        match outcome {
            RequestOutcome::Duplicate => {
                // Reconnect re-pushes land here; the original offer keeps its receipt time.
                debug!(%assignment_id, "duplicate assignment request ignored");
            }
            _ => {
                info!(%assignment_id, ?outcome, pending = self.queue.len(), "assignment offered");
                self.notifier.notify(notification);
            }
        }
        outcome
    }

    /// Server-side timeout. Idempotent.
    pub fn on_assignment_timeout(&mut self, event: AssignmentTimeout) -> Option<AssignmentOffer> {
        let offer = self.resolve(
            &event.assignment_id,
            Resolution::TimedOut(TimeoutSource::Server),
        )?;
        self.notifier.notify(Notification::TimedOut {
            assignment_id: offer.assignment_id.clone(),
            order_number: event.order_number,
            source: TimeoutSource::Server,
        });
        Some(offer)
    }

    pub fn accept(
        &mut self,
        assignment_id: &AssignmentId,
        order: &OrderSummary,
    ) -> Option<AssignmentOffer> {
        let offer = self.resolve(assignment_id, Resolution::Accepted)?;
        self.notifier.notify(Notification::Accepted {
            assignment_id: offer.assignment_id.clone(),
            table_number: order.table_number,
            order_number: order.order_number.clone(),
        });
        Some(offer)
    }

    pub fn pass(&mut self, assignment_id: &AssignmentId) -> Option<AssignmentOffer> {
        let offer = self.resolve(assignment_id, Resolution::Passed)?;
        self.notifier.notify(Notification::Passed {
            assignment_id: offer.assignment_id.clone(),
        });
        Some(offer)
    }

    /// Client-side timeout. Races the server timeout; whichever runs first wins.
    pub fn timeout_locally(&mut self, assignment_id: &AssignmentId) -> Option<AssignmentOffer> {
        let offer = self.resolve(assignment_id, Resolution::TimedOut(TimeoutSource::Local))?;
        self.notifier.notify(Notification::TimedOut {
            assignment_id: offer.assignment_id.clone(),
            order_number: offer.order.order_number.clone(),
            source: TimeoutSource::Local,
        });
        Some(offer)
    }

    /// Records transport state. Queued offers are kept across disconnects.
    pub fn set_connected(&mut self, connected: bool) {
        if self.connected == connected {
            return;
        }
        self.connected = connected;
        if connected {
            self.notifier.notify(Notification::ConnectionRestored);
        } else {
            self.notifier.notify(Notification::ConnectionLost);
        }
    }

    pub fn pending_assignments(&self) -> impl Iterator<Item = &AssignmentOffer> {
        self.queue.pending()
    }

    pub fn active_assignment(&self) -> Option<&AssignmentOffer> {
        self.queue.active_offer()
    }

    pub fn find(&self, assignment_id: &AssignmentId) -> Option<&AssignmentOffer> {
        self.queue.get(assignment_id)
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn has_pending_assignments(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn next_deadline(&self, grace: Duration) -> Option<Instant> {
        self.queue.earliest_deadline(grace)
    }

    pub fn expired(&self, now: Instant, grace: Duration) -> Vec<AssignmentId> {
        self.queue.expired(now, grace)
    }

    pub fn snapshot(&self) -> AssignmentSnapshot {
        AssignmentSnapshot {
            pending: self.queue.pending().cloned().collect(),
            connected: self.connected,
        }
    }

    fn resolve(
        &mut self,
        assignment_id: &AssignmentId,
        resolution: Resolution,
    ) -> Option<AssignmentOffer> {
        let Some(removed) = self.queue.remove(assignment_id) else {
            debug!(%assignment_id, %resolution, "stale assignment reference ignored");
            return None;
        };

        self.remember_resolved(assignment_id.clone());
        info!(
            %assignment_id,
            %resolution,
            was_active = removed.was_active,
            next = ?self.queue.active_offer().map(|offer| offer.assignment_id.as_str()),
            "assignment resolved"
        );
        Some(removed.offer)
    }

    fn remember_resolved(&mut self, assignment_id: AssignmentId) {
        if self.resolved_capacity == 0 {
            return;
        }
        if self.resolved.len() == self.resolved_capacity {
            self.resolved.pop_front();
        }
        self.resolved.push_back(assignment_id);
    }
}
