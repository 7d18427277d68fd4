// The single event loop that owns the assignment controller.

use crate::domain::{Notifier, PushChannel, PushEvent};
use crate::use_cases::controller::AssignmentController;
use crate::use_cases::types::{AssignmentSnapshot, Decision, UserCommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Tunables for the session loop.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Extra time past an offer's timeout before the client times it out itself.
    pub timeout_grace: Duration,
}

/// Channels connecting the session to the presentation layer.
pub struct SessionChannels {
    pub commands: mpsc::Receiver<UserCommand>,
    pub decisions: mpsc::Sender<Decision>,
    pub snapshots: watch::Sender<AssignmentSnapshot>,
}

/// Drives the controller until shutdown, the command channel closes, or the
/// push channel goes away. Returns the controller so callers can inspect it.
///
/// Channel events, user commands and the local deadline are all serialized
/// here, so the controller never sees concurrent mutation.
pub async fn run_session<C, N>(
    channel: &C,
    mut controller: AssignmentController<N>,
    channels: SessionChannels,
    settings: SessionSettings,
    shutdown: Arc<Notify>,
) -> AssignmentController<N>
where
    C: PushChannel + ?Sized,
    N: Notifier,
{
    let SessionChannels {
        mut commands,
        decisions,
        snapshots,
    } = channels;

    // Subscribe before reading any state so no event slips between the two.
    // One subscription for both kinds keeps requests and timeouts in delivery order.
    let mut events = channel.subscribe_events();
    let mut connection = channel.connection_state();

    let connected = *connection.borrow_and_update();
    controller.set_connected(connected);
    snapshots.send_replace(controller.snapshot());

    loop {
        let deadline = controller.next_deadline(settings.timeout_grace);

        tokio::select! {
            _ = shutdown.notified() => {
                info!("assignment session shutting down");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("push event channel closed; ending session");
                    break;
                };
                match event {
                    PushEvent::Request(request) => {
                        controller.on_assignment_request(request, Instant::now());
                    }
                    PushEvent::Timeout(timeout) => {
                        controller.on_assignment_timeout(timeout);
                    }
                }
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    warn!("connection state channel closed; ending session");
                    break;
                }
                let connected = *connection.borrow_and_update();
                controller.set_connected(connected);
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("command channel closed; ending session");
                    break;
                };
                if let Some(decision) = apply_command(&mut controller, command) {
                    report_decision(&decisions, decision);
                }
            }
            _ = wait_until(deadline) => {
                for assignment_id in controller.expired(Instant::now(), settings.timeout_grace) {
                    controller.timeout_locally(&assignment_id);
                }
            }
        }

        snapshots.send_replace(controller.snapshot());
    }

    controller
}

fn apply_command<N: Notifier>(
    controller: &mut AssignmentController<N>,
    command: UserCommand,
) -> Option<Decision> {
    match command {
        UserCommand::Accept(assignment_id) => {
            // The order snapshot travels with the offer; absent ids fall through as no-ops.
            let order = controller.find(&assignment_id)?.order.clone();
            controller
                .accept(&assignment_id, &order)
                .map(|_| Decision::Accepted(assignment_id))
        }
        UserCommand::Pass(assignment_id) => controller
            .pass(&assignment_id)
            .map(|_| Decision::Passed(assignment_id)),
    }
}

fn report_decision(decisions: &mpsc::Sender<Decision>, decision: Decision) {
    match decisions.try_send(decision) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(decision)) => {
            warn!(?decision, "decision channel full; dropping decision");
        }
        Err(mpsc::error::TrySendError::Closed(decision)) => {
            debug!(?decision, "decision channel closed; dropping decision");
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
