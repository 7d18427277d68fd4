// Use cases layer: the assignment controller and the session loop driving it.

pub mod controller;
pub mod decisions;
pub mod session;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;

pub use controller::{AssignmentController, RequestOutcome};
pub use decisions::forward_decisions;
pub use session::{SessionChannels, SessionSettings, run_session};
pub use types::{AssignmentSnapshot, Decision, UserCommand};
