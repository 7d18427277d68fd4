use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
}

/// Order snapshot copied into every offer; never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub table_number: u32,
    pub order_number: String,
    pub items: Vec<OrderItem>,
}

/// A pending offer broadcast to an ordered list of candidate staff members.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub assignment_id: String,
    pub order: OrderSummary,
    // Ordered; a candidate's position is its index plus one.
    candidates: Vec<String>,
    declined: HashSet<String>,
    pub timeout: Duration,
    pub created_at: Instant,
}

impl Assignment {
    pub fn new(
        assignment_id: String,
        order: OrderSummary,
        candidates: Vec<String>,
        timeout: Duration,
        created_at: Instant,
    ) -> Self {
        Self {
            assignment_id,
            order,
            candidates,
            declined: HashSet::new(),
            timeout,
            created_at,
        }
    }

    pub fn total_waiters(&self) -> usize {
        self.candidates.len()
    }

    /// 1-based rank of the staff member, if they are a candidate.
    pub fn position_of(&self, staff_id: &str) -> Option<usize> {
        self.candidates
            .iter()
            .position(|candidate| candidate == staff_id)
            .map(|index| index + 1)
    }

    pub fn is_candidate(&self, staff_id: &str) -> bool {
        self.position_of(staff_id).is_some()
    }

    pub fn has_declined(&self, staff_id: &str) -> bool {
        self.declined.contains(staff_id)
    }

    /// Candidates that still have the offer open.
    pub fn open_candidates(&self) -> impl Iterator<Item = &str> {
        self.candidates
            .iter()
            .filter(|candidate| !self.declined.contains(candidate.as_str()))
            .map(String::as_str)
    }

    /// Records a pass. Returns true once every candidate has passed.
    pub fn decline(&mut self, staff_id: &str) -> bool {
        self.declined.insert(staff_id.to_string());
        self.open_candidates().next().is_none()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.timeout
            .saturating_sub(now.saturating_duration_since(self.created_at))
    }
}
