use crate::domain::DecisionSink;
use crate::use_cases::types::Decision;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Reports local decisions to the server until the session drops its sender.
///
/// Failures are logged and not retried: the server timeout still settles the
/// assignment if a decision never lands.
pub async fn forward_decisions<D>(sink: Arc<D>, mut decisions: mpsc::Receiver<Decision>)
where
    D: DecisionSink + ?Sized,
{
    while let Some(decision) = decisions.recv().await {
        let result = match &decision {
            Decision::Accepted(assignment_id) => sink.accept(assignment_id).await,
            Decision::Passed(assignment_id) => sink.pass(assignment_id).await,
        };

        match result {
            Ok(()) => info!(?decision, "decision reported"),
            Err(error) => warn!(?decision, %error, "failed to report decision"),
        }
    }
}
