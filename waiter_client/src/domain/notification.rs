// User-facing notifications emitted by the assignment controller.

use crate::domain::offer::{AssignmentId, TimeoutSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    NewAssignment {
        assignment_id: AssignmentId,
        table_number: u32,
        order_number: String,
        position: u32,
        total_waiters: u32,
    },
    Accepted {
        assignment_id: AssignmentId,
        table_number: u32,
        order_number: String,
    },
    Passed {
        assignment_id: AssignmentId,
    },
    TimedOut {
        assignment_id: AssignmentId,
        order_number: String,
        source: TimeoutSource,
    },
    ConnectionLost,
    ConnectionRestored,
}

impl Notification {
    pub fn level(&self) -> NotificationLevel {
        match self {
            Notification::NewAssignment { .. }
            | Notification::Passed { .. }
            | Notification::ConnectionRestored => NotificationLevel::Info,
            Notification::Accepted { .. } => NotificationLevel::Success,
            Notification::TimedOut { .. } | Notification::ConnectionLost => {
                NotificationLevel::Warning
            }
        }
    }

    /// Short text suitable for a toast or a terminal line.
    pub fn message(&self) -> String {
        match self {
            Notification::NewAssignment {
                table_number,
                order_number,
                position,
                total_waiters,
                ..
            } => format!(
                "New order {order_number} for table {table_number} ({position}/{total_waiters})"
            ),
            Notification::Accepted {
                table_number,
                order_number,
                ..
            } => format!("Order {order_number} for table {table_number} is yours"),
            Notification::Passed { assignment_id } => {
                format!("Passed on assignment {assignment_id}")
            }
            Notification::TimedOut { order_number, .. } => {
                format!("Assignment for order {order_number} timed out")
            }
            Notification::ConnectionLost => "Connection lost; reconnecting".to_string(),
            Notification::ConnectionRestored => "Connection restored".to_string(),
        }
    }
}
