use crate::domain::OrderSummary;
use std::time::Duration;

/// Event queued on a staff member's connection outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    AssignmentRequest {
        assignment_id: String,
        order: OrderSummary,
        // Time left on the offer when the event was queued.
        timeout: Duration,
        position: usize,
        total_waiters: usize,
    },
    AssignmentTimeout {
        assignment_id: String,
        order_number: String,
    },
}

/// Input for creating an assignment.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub order: OrderSummary,
    pub candidate_staff_ids: Vec<String>,
    /// Falls back to the dispatcher default when absent.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAssignment {
    pub assignment_id: String,
    pub total_waiters: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Passed,
    // Last open candidate passed; the assignment is gone.
    Expired,
}
