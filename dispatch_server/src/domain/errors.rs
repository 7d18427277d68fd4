use std::fmt;

// Domain-level errors for dispatch workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    EmptyCandidates,
    MissingOrderNumber,
    InvalidTimeout,
    NotFound,
    AlreadyResolved,
    NotCandidate,
    // The staff member passed earlier and can no longer accept.
    AlreadyDeclined,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            DispatchError::EmptyCandidates => "candidateStaffIds must not be empty",
            DispatchError::MissingOrderNumber => "order.orderNumber is required",
            DispatchError::InvalidTimeout => "timeoutMs must be greater than zero",
            DispatchError::NotFound => "assignment not found",
            DispatchError::AlreadyResolved => "assignment already resolved",
            DispatchError::NotCandidate => "staff member is not a candidate for this assignment",
            DispatchError::AlreadyDeclined => "staff member already passed on this assignment",
        };
        f.write_str(message)
    }
}

impl std::error::Error for DispatchError {}
