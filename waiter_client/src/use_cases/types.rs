// Use-case level inputs/outputs for the assignment session loop.

use crate::domain::{AssignmentId, AssignmentOffer};

/// Decision requested by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Accept(AssignmentId),
    Pass(AssignmentId),
}

/// A decision that actually removed an offer and should be reported upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted(AssignmentId),
    Passed(AssignmentId),
}

/// Read model published after every queue mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentSnapshot {
    pub pending: Vec<AssignmentOffer>,
    pub connected: bool,
}

impl AssignmentSnapshot {
    pub fn active(&self) -> Option<&AssignmentOffer> {
        self.pending.first()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
