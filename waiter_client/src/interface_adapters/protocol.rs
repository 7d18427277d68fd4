// Wire protocol DTOs for events pushed by the dispatch server, and their
// conversion into domain types.

use crate::domain::{
    AssignmentId, AssignmentRequest, AssignmentTimeout, OrderItem, OrderSummary, PushEvent,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Envelope for every server-to-client WebSocket frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "order:assignment-request")]
    AssignmentRequest(AssignmentRequestDto),
    #[serde(rename = "order:assignment-timeout")]
    AssignmentTimeout(AssignmentTimeoutDto),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequestDto {
    // Optional on the wire so a missing id is reported as such, not as a parse error.
    #[serde(default)]
    pub assignment_id: Option<String>,
    pub order: OrderDto,
    // Milliseconds.
    pub timeout: u64,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub total_waiters: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentTimeoutDto {
    #[serde(default)]
    pub assignment_id: Option<String>,
    #[serde(default)]
    pub order_number: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub table_number: u32,
    pub order_number: String,
    #[serde(default)]
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemDto {
    pub name: String,
    pub quantity: u32,
}

/// Body for accept/pass calls against the dispatch server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest<'a> {
    pub staff_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug)]
pub enum EventError {
    Malformed(serde_json::Error),
    MissingAssignmentId,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::Malformed(err) => write!(f, "malformed event payload: {err}"),
            EventError::MissingAssignmentId => f.write_str("event is missing assignmentId"),
        }
    }
}

impl std::error::Error for EventError {}

/// Parses a text frame into a validated event.
pub fn decode_event(text: &str) -> Result<PushEvent, EventError> {
    let event = serde_json::from_str::<ServerEvent>(text).map_err(EventError::Malformed)?;
    match event {
        ServerEvent::AssignmentRequest(dto) => dto.try_into().map(PushEvent::Request),
        ServerEvent::AssignmentTimeout(dto) => dto.try_into().map(PushEvent::Timeout),
    }
}

fn assignment_id(raw: Option<String>) -> Result<AssignmentId, EventError> {
    match raw {
        Some(id) if !id.trim().is_empty() => Ok(AssignmentId::new(id)),
        _ => Err(EventError::MissingAssignmentId),
    }
}

impl TryFrom<AssignmentRequestDto> for AssignmentRequest {
    type Error = EventError;

    fn try_from(dto: AssignmentRequestDto) -> Result<Self, Self::Error> {
        Ok(Self {
            assignment_id: assignment_id(dto.assignment_id)?,
            order: dto.order.into(),
            timeout: Duration::from_millis(dto.timeout),
            position: dto.position,
            total_waiters: dto.total_waiters,
        })
    }
}

impl TryFrom<AssignmentTimeoutDto> for AssignmentTimeout {
    type Error = EventError;

    fn try_from(dto: AssignmentTimeoutDto) -> Result<Self, Self::Error> {
        Ok(Self {
            assignment_id: assignment_id(dto.assignment_id)?,
            order_number: dto.order_number,
        })
    }
}

impl From<OrderDto> for OrderSummary {
    fn from(order: OrderDto) -> Self {
        Self {
            table_number: order.table_number,
            order_number: order.order_number,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItem {
                    name: item.name,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}
