// Wire protocol DTOs for the dispatch HTTP API and WebSocket push events.

use crate::domain::{OrderItem, OrderSummary};
use crate::use_cases::OutboundEvent;
use serde::{Deserialize, Serialize};

/// Envelope for every server-to-client WebSocket frame.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "order:assignment-request")]
    AssignmentRequest(AssignmentRequestDto),
    #[serde(rename = "order:assignment-timeout")]
    AssignmentTimeout(AssignmentTimeoutDto),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequestDto {
    pub assignment_id: String,
    pub order: OrderDto,
    // Milliseconds left on the offer.
    pub timeout: u64,
    pub position: usize,
    pub total_waiters: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentTimeoutDto {
    pub assignment_id: String,
    pub order_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    #[serde(default)]
    pub table_number: u32,
    // Defaulted so a missing number is reported as a 400, not a 422.
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDto {
    pub name: String,
    pub quantity: u32,
}

// Request payload for creating an assignment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub order: OrderDto,
    #[serde(default)]
    pub candidate_staff_ids: Vec<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentResponse {
    pub assignment_id: String,
    pub total_waiters: usize,
}

// Request payload for accept and pass.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub staff_id: String,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub status: DecisionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Accepted,
    Passed,
    Expired,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl From<OrderDto> for OrderSummary {
    fn from(dto: OrderDto) -> Self {
        Self {
            table_number: dto.table_number,
            order_number: dto.order_number.trim().to_string(),
            items: dto
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

impl From<OrderSummary> for OrderDto {
    fn from(order: OrderSummary) -> Self {
        Self {
            table_number: order.table_number,
            order_number: order.order_number,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemDto {
                    name: item.name,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

impl From<OutboundEvent> for ServerEvent {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::AssignmentRequest {
                assignment_id,
                order,
                timeout,
                position,
                total_waiters,
            } => ServerEvent::AssignmentRequest(AssignmentRequestDto {
                assignment_id,
                order: order.into(),
                timeout: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                position,
                total_waiters,
            }),
            OutboundEvent::AssignmentTimeout {
                assignment_id,
                order_number,
            } => ServerEvent::AssignmentTimeout(AssignmentTimeoutDto {
                assignment_id,
                order_number,
            }),
        }
    }
}
