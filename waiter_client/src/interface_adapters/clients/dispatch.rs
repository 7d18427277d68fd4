use crate::domain::{AssignmentId, DecisionError, DecisionSink};
use crate::interface_adapters::protocol::{DecisionRequest, ErrorResponse};
use async_trait::async_trait;
use std::time::Duration;

// Thin reqwest client that reports accept/pass decisions to the dispatch server.
#[derive(Clone)]
pub struct DispatchClient {
    http: reqwest::Client,
    base_url: String,
    staff_id: String,
}

impl DispatchClient {
    pub fn new(
        base_url: impl Into<String>,
        staff_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            staff_id: staff_id.into(),
        })
    }

    async fn post_decision(
        &self,
        assignment_id: &AssignmentId,
        action: &str,
    ) -> Result<(), DecisionError> {
        let url = format!("{}/assignments/{}/{action}", self.base_url, assignment_id);
        let response = self
            .http
            .post(url)
            .json(&DecisionRequest {
                staff_id: &self.staff_id,
            })
            .send()
            .await
            .map_err(|e| DecisionError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Keep the upstream message so the UI can say why a decision was refused.
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|payload| payload.message);
        Err(DecisionError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DecisionSink for DispatchClient {
    async fn accept(&self, assignment_id: &AssignmentId) -> Result<(), DecisionError> {
        self.post_decision(assignment_id, "accept").await
    }

    async fn pass(&self, assignment_id: &AssignmentId) -> Result<(), DecisionError> {
        self.post_decision(assignment_id, "pass").await
    }
}
