pub mod assignments;

pub use assignments::{accept_assignment, create_assignment, pass_assignment};

// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
