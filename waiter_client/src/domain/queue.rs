use crate::domain::offer::{AssignmentId, AssignmentOffer};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Result of offering a new assignment to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    // Queue was empty, so the offer is now presented to the user.
    Activated,
    // Waiting behind the active offer; `position` is 0-based from the head.
    Queued { position: usize },
    // An offer with the same id is already queued; nothing changed.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedOffer {
    pub offer: AssignmentOffer,
    pub was_active: bool,
}

/// FIFO of pending offers. The head is always the active offer.
#[derive(Debug, Default)]
pub struct AssignmentQueue {
    offers: VecDeque<AssignmentOffer>,
}

impl AssignmentQueue {
    pub fn new() -> Self {
        Self {
            offers: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, offer: AssignmentOffer) -> EnqueueOutcome {
        if self.contains(&offer.assignment_id) {
            return EnqueueOutcome::Duplicate;
        }

        self.offers.push_back(offer);
        match self.offers.len() {
            1 => EnqueueOutcome::Activated,
            len => EnqueueOutcome::Queued { position: len - 1 },
        }
    }

    /// Removes the offer wherever it sits. Absent ids are a no-op.
    pub fn remove(&mut self, assignment_id: &AssignmentId) -> Option<RemovedOffer> {
        let index = self
            .offers
            .iter()
            .position(|offer| &offer.assignment_id == assignment_id)?;
        // NOTE: VecDeque::remove shifts the tail; queues here stay in the single digits.
        let offer = self.offers.remove(index)?;

        Some(RemovedOffer {
            offer,
            was_active: index == 0,
        })
    }

    pub fn active_offer(&self) -> Option<&AssignmentOffer> {
        self.offers.front()
    }

    pub fn get(&self, assignment_id: &AssignmentId) -> Option<&AssignmentOffer> {
        self.offers
            .iter()
            .find(|offer| &offer.assignment_id == assignment_id)
    }

    pub fn contains(&self, assignment_id: &AssignmentId) -> bool {
        self.get(assignment_id).is_some()
    }

    pub fn pending(&self) -> impl Iterator<Item = &AssignmentOffer> {
        self.offers.iter()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    // Offers are not sorted by deadline (timeouts differ), so scan them all.
    pub fn earliest_deadline(&self, grace: Duration) -> Option<Instant> {
        self.offers
            .iter()
            .map(|offer| offer.local_deadline(grace))
            .min()
    }

    pub fn expired(&self, now: Instant, grace: Duration) -> Vec<AssignmentId> {
        self.offers
            .iter()
            .filter(|offer| offer.local_deadline(grace) <= now)
            .map(|offer| offer.assignment_id.clone())
            .collect()
    }
}
