// In-memory dispatcher that offers orders to candidate staff and settles them.

use crate::domain::{Assignment, DispatchError};
use crate::use_cases::types::{CreatedAssignment, NewAssignment, OutboundEvent, PassOutcome};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Shared configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Offer lifetime when the creator does not specify one.
    pub default_timeout: Duration,
    /// How many settled ids are kept to answer late calls with "already resolved".
    pub resolved_memory: usize,
}

// Live connection for one staff member; `token` tells replaced sockets apart.
#[derive(Debug)]
struct StaffConnection {
    token: u64,
    outbox: mpsc::Sender<OutboundEvent>,
}

/// Owns every pending assignment and the outbox of each connected staff member.
///
/// Settling an assignment (accept, last pass, expiry) removes it from the
/// pending map, so every later settle attempt is answered from
/// `recently_resolved` and never repeats side effects.
#[derive(Debug)]
pub struct Dispatcher {
    settings: DispatchSettings,
    assignments: HashMap<String, Assignment>,
    connections: HashMap<String, StaffConnection>,
    recently_resolved: VecDeque<String>,
}

impl Dispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self {
            recently_resolved: VecDeque::with_capacity(settings.resolved_memory),
            settings,
            assignments: HashMap::new(),
            connections: HashMap::new(),
        }
    }

    /// Creates an assignment and pushes it to every connected candidate.
    pub fn create(
        &mut self,
        request: NewAssignment,
        now: Instant,
    ) -> Result<CreatedAssignment, DispatchError> {
        if request.order.order_number.trim().is_empty() {
            return Err(DispatchError::MissingOrderNumber);
        }

        // Keep the first occurrence of each id so positions stay stable.
        let mut seen = HashSet::new();
        let candidates: Vec<String> = request
            .candidate_staff_ids
            .into_iter()
            .map(|staff_id| staff_id.trim().to_string())
            .filter(|staff_id| !staff_id.is_empty() && seen.insert(staff_id.clone()))
            .collect();
        if candidates.is_empty() {
            return Err(DispatchError::EmptyCandidates);
        }

        let timeout = request.timeout.unwrap_or(self.settings.default_timeout);
        if timeout.is_zero() {
            return Err(DispatchError::InvalidTimeout);
        }

        let assignment_id = uuid::Uuid::new_v4().to_string();
        let assignment = Assignment::new(
            assignment_id.clone(),
            request.order,
            candidates,
            timeout,
            now,
        );
        let total_waiters = assignment.total_waiters();

        let recipients: Vec<String> = assignment.open_candidates().map(str::to_string).collect();
        for staff_id in &recipients {
            if let Some(event) = request_event(&assignment, staff_id, now) {
                self.send_to(staff_id, event);
            }
        }

        info!(
            %assignment_id,
            order_number = %assignment.order.order_number,
            total_waiters,
            timeout_ms = timeout.as_millis(),
            "assignment created"
        );
        self.assignments.insert(assignment_id.clone(), assignment);

        Ok(CreatedAssignment {
            assignment_id,
            total_waiters,
            timeout,
        })
    }

    /// First accept wins; the other open candidates are told the offer is gone.
    pub fn accept(&mut self, assignment_id: &str, staff_id: &str) -> Result<(), DispatchError> {
        let assignment = self.pending(assignment_id)?;
        if !assignment.is_candidate(staff_id) {
            return Err(DispatchError::NotCandidate);
        }
        if assignment.has_declined(staff_id) {
            return Err(DispatchError::AlreadyDeclined);
        }

        let Some(assignment) = self.settle(assignment_id) else {
            return Err(DispatchError::NotFound);
        };
        self.notify_open_candidates(&assignment, Some(staff_id));
        info!(%assignment_id, %staff_id, "assignment accepted");
        Ok(())
    }

    /// Records a pass. Passing twice is harmless; the last open pass expires the offer.
    pub fn pass(
        &mut self,
        assignment_id: &str,
        staff_id: &str,
    ) -> Result<PassOutcome, DispatchError> {
        let assignment = self
            .assignments
            .get_mut(assignment_id)
            .ok_or_else(|| resolved_or_missing(&self.recently_resolved, assignment_id))?;
        if !assignment.is_candidate(staff_id) {
            return Err(DispatchError::NotCandidate);
        }

        if !assignment.decline(staff_id) {
            debug!(%assignment_id, %staff_id, "assignment passed");
            return Ok(PassOutcome::Passed);
        }

        self.settle(assignment_id);
        info!(%assignment_id, "every candidate passed; assignment expired");
        Ok(PassOutcome::Expired)
    }

    /// Expires a pending assignment. Returns false when it was already settled.
    pub fn expire(&mut self, assignment_id: &str) -> bool {
        let Some(assignment) = self.settle(assignment_id) else {
            debug!(%assignment_id, "expiry ignored; assignment already settled");
            return false;
        };
        self.notify_open_candidates(&assignment, None);
        info!(%assignment_id, "assignment timed out");
        true
    }

    /// Installs the outbox for a staff member, replacing any older connection,
    /// and re-pushes every offer still open to them with its remaining time.
    /// Returns how many offers were re-pushed.
    pub fn register_connection(
        &mut self,
        staff_id: &str,
        token: u64,
        outbox: mpsc::Sender<OutboundEvent>,
        now: Instant,
    ) -> usize {
        if let Some(previous) = self
            .connections
            .insert(staff_id.to_string(), StaffConnection { token, outbox })
        {
            // Dropping the old sender closes that socket's outbox.
            info!(%staff_id, previous_token = previous.token, "connection replaced");
        }

        let mut pending: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|assignment| assignment.open_candidates().any(|c| c == staff_id))
            .collect();
        pending.sort_by_key(|assignment| assignment.created_at);
        let events: Vec<OutboundEvent> = pending
            .into_iter()
            .filter_map(|assignment| request_event(assignment, staff_id, now))
            .collect();

        let repushed = events.len();
        for event in events {
            self.send_to(staff_id, event);
        }
        repushed
    }

    /// Removes the connection only if `token` still owns it.
    pub fn unregister_connection(&mut self, staff_id: &str, token: u64) -> bool {
        match self.connections.get(staff_id) {
            Some(connection) if connection.token == token => {
                self.connections.remove(staff_id);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, assignment_id: &str) -> bool {
        self.assignments.contains_key(assignment_id)
    }

    pub fn is_connected(&self, staff_id: &str) -> bool {
        self.connections.contains_key(staff_id)
    }

    fn pending(&self, assignment_id: &str) -> Result<&Assignment, DispatchError> {
        self.assignments
            .get(assignment_id)
            .ok_or_else(|| resolved_or_missing(&self.recently_resolved, assignment_id))
    }

    fn settle(&mut self, assignment_id: &str) -> Option<Assignment> {
        let assignment = self.assignments.remove(assignment_id)?;
        if self.settings.resolved_memory > 0 {
            if self.recently_resolved.len() == self.settings.resolved_memory {
                self.recently_resolved.pop_front();
            }
            self.recently_resolved.push_back(assignment_id.to_string());
        }
        Some(assignment)
    }

    fn notify_open_candidates(&mut self, assignment: &Assignment, except: Option<&str>) {
        let recipients: Vec<String> = assignment
            .open_candidates()
            .filter(|staff_id| Some(*staff_id) != except)
            .map(str::to_string)
            .collect();
        for staff_id in recipients {
            self.send_to(
                &staff_id,
                OutboundEvent::AssignmentTimeout {
                    assignment_id: assignment.assignment_id.clone(),
                    order_number: assignment.order.order_number.clone(),
                },
            );
        }
    }

    // Offline staff simply miss the event; reconnect re-pushes what is still open.
    fn send_to(&mut self, staff_id: &str, event: OutboundEvent) {
        let Some(connection) = self.connections.get(staff_id) else {
            return;
        };
        match connection.outbox.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(%staff_id, ?event, "staff outbox full; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(%staff_id, "staff outbox closed; dropping connection");
                self.connections.remove(staff_id);
            }
        }
    }
}

fn resolved_or_missing(recently_resolved: &VecDeque<String>, assignment_id: &str) -> DispatchError {
    if recently_resolved.iter().any(|id| id == assignment_id) {
        DispatchError::AlreadyResolved
    } else {
        DispatchError::NotFound
    }
}

fn request_event(assignment: &Assignment, staff_id: &str, now: Instant) -> Option<OutboundEvent> {
    let remaining = assignment.remaining(now);
    if remaining.is_zero() {
        return None;
    }
    Some(OutboundEvent::AssignmentRequest {
        assignment_id: assignment.assignment_id.clone(),
        order: assignment.order.clone(),
        timeout: remaining,
        position: assignment.position_of(staff_id)?,
        total_waiters: assignment.total_waiters(),
    })
}

/// Expires the assignment once `timeout` elapses unless it settled first.
pub fn spawn_expiry_watcher(
    dispatcher: Arc<Mutex<Dispatcher>>,
    assignment_id: String,
    timeout: Duration,
) -> tokio::task::JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        dispatcher.lock().await.expire(&assignment_id)
    })
}
