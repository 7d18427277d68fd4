use crate::domain::DispatchError;
use crate::interface_adapters::protocol::{
    CreateAssignmentRequest, CreateAssignmentResponse, DecisionRequest, DecisionResponse,
    DecisionStatus, ErrorResponse,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{NewAssignment, PassOutcome, spawn_expiry_watcher};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

type ApiError = (StatusCode, Json<ErrorResponse>);

// Create an assignment, push it to candidates and arm its expiry timer.
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<CreateAssignmentResponse>), ApiError> {
    let new_assignment = NewAssignment {
        order: request.order.into(),
        candidate_staff_ids: request.candidate_staff_ids,
        timeout: request.timeout_ms.map(Duration::from_millis),
    };

    let created = {
        let mut dispatcher = state.dispatcher.lock().await;
        dispatcher.create(new_assignment, Instant::now())
    }
    .map_err(map_dispatch_error)?;

    spawn_expiry_watcher(
        state.dispatcher.clone(),
        created.assignment_id.clone(),
        created.timeout,
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateAssignmentResponse {
            assignment_id: created.assignment_id,
            total_waiters: created.total_waiters,
        }),
    ))
}

pub async fn accept_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    state
        .dispatcher
        .lock()
        .await
        .accept(&assignment_id, request.staff_id.trim())
        .map_err(map_dispatch_error)?;

    Ok(Json(DecisionResponse {
        status: DecisionStatus::Accepted,
    }))
}

pub async fn pass_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let outcome = state
        .dispatcher
        .lock()
        .await
        .pass(&assignment_id, request.staff_id.trim())
        .map_err(map_dispatch_error)?;

    let status = match outcome {
        PassOutcome::Passed => DecisionStatus::Passed,
        PassOutcome::Expired => DecisionStatus::Expired,
    };
    Ok(Json(DecisionResponse { status }))
}

// Maps domain errors to HTTP responses.
fn map_dispatch_error(err: DispatchError) -> ApiError {
    let status = match err {
        DispatchError::EmptyCandidates
        | DispatchError::MissingOrderNumber
        | DispatchError::InvalidTimeout => StatusCode::BAD_REQUEST,
        DispatchError::NotCandidate => StatusCode::FORBIDDEN,
        DispatchError::NotFound
        | DispatchError::AlreadyResolved
        | DispatchError::AlreadyDeclined => StatusCode::CONFLICT,
    };
    (
        status,
        Json(ErrorResponse {
            message: err.to_string(),
        }),
    )
}
