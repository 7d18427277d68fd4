use crate::interface_adapters::handlers::{
    accept_assignment, create_assignment, health, pass_assignment,
};
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

// Build the router for the dispatch API and the staff socket.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route("/assignments", post(create_assignment))
        .route("/assignments/{id}/accept", post(accept_assignment))
        .route("/assignments/{id}/pass", post(pass_assignment))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::{DispatchSettings, Dispatcher};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    fn build_test_app() -> Router {
        let state = Arc::new(AppState {
            dispatcher: Arc::new(Mutex::new(Dispatcher::new(DispatchSettings {
                default_timeout: Duration::from_secs(30),
                resolved_memory: 16,
            }))),
            outbox_capacity: 8,
        });

        app(state)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("expected request to build")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("expected response body");
        serde_json::from_slice(&body).expect("expected json body")
    }

    async fn create(app: &Router, candidates: &str) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/assignments",
                &format!(
                    r#"{{"order":{{"tableNumber":4,"orderNumber":"ORD-1","items":[]}},"candidateStaffIds":{candidates}}}"#
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["assignmentId"]
            .as_str()
            .expect("expected assignment id")
            .to_string()
    }

    #[tokio::test]
    async fn when_health_is_requested_then_returns_200_ok() {
        let app = build_test_app();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("expected request to build");

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("expected response body");
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn when_assignment_is_created_then_returns_201_with_total_waiters() {
        let app = build_test_app();

        let response = app
            .oneshot(post_json(
                "/assignments",
                r#"{"order":{"tableNumber":4,"orderNumber":"ORD-1"},"candidateStaffIds":["w-1","w-2"],"timeoutMs":5000}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let payload = json_body(response).await;
        assert_eq!(payload["totalWaiters"], 2);
        assert!(payload["assignmentId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn when_candidates_are_empty_then_returns_400_and_error_message() {
        let app = build_test_app();

        let response = app
            .oneshot(post_json(
                "/assignments",
                r#"{"order":{"tableNumber":4,"orderNumber":"ORD-1"},"candidateStaffIds":[]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = json_body(response).await;
        assert_eq!(payload["message"], "candidateStaffIds must not be empty");
    }

    #[tokio::test]
    async fn when_order_number_is_missing_then_returns_400_and_error_message() {
        let app = build_test_app();

        let response = app
            .oneshot(post_json(
                "/assignments",
                r#"{"order":{"tableNumber":4},"candidateStaffIds":["w-1"]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = json_body(response).await;
        assert_eq!(payload["message"], "order.orderNumber is required");
    }

    #[tokio::test]
    async fn when_create_payload_is_missing_order_then_returns_422() {
        let app = build_test_app();

        let response = app
            .oneshot(post_json("/assignments", r#"{"candidateStaffIds":["w-1"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn when_candidate_accepts_twice_then_second_call_returns_409() {
        let app = build_test_app();
        let assignment_id = create(&app, r#"["w-1","w-2"]"#).await;
        let uri = format!("/assignments/{assignment_id}/accept");

        let first = app
            .clone()
            .oneshot(post_json(&uri, r#"{"staffId":"w-1"}"#))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(json_body(first).await["status"], "accepted");

        let second = app
            .oneshot(post_json(&uri, r#"{"staffId":"w-2"}"#))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(second).await["message"], "assignment already resolved");
    }

    #[tokio::test]
    async fn when_staff_is_not_a_candidate_then_accept_returns_403() {
        let app = build_test_app();
        let assignment_id = create(&app, r#"["w-1"]"#).await;

        let response = app
            .oneshot(post_json(
                &format!("/assignments/{assignment_id}/accept"),
                r#"{"staffId":"w-9"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn when_assignment_is_unknown_then_accept_returns_409() {
        let app = build_test_app();

        let response = app
            .oneshot(post_json(
                "/assignments/does-not-exist/accept",
                r#"{"staffId":"w-1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["message"], "assignment not found");
    }

    #[tokio::test]
    async fn when_every_candidate_passes_then_last_pass_reports_expired() {
        let app = build_test_app();
        let assignment_id = create(&app, r#"["w-1","w-2"]"#).await;
        let uri = format!("/assignments/{assignment_id}/pass");

        let first = app
            .clone()
            .oneshot(post_json(&uri, r#"{"staffId":"w-1"}"#))
            .await
            .unwrap();
        assert_eq!(json_body(first).await["status"], "passed");

        let last = app
            .oneshot(post_json(&uri, r#"{"staffId":"w-2"}"#))
            .await
            .unwrap();
        assert_eq!(last.status(), StatusCode::OK);
        assert_eq!(json_body(last).await["status"], "expired");
    }

    #[tokio::test]
    async fn when_ws_is_requested_without_upgrade_headers_then_returns_client_error() {
        let app = build_test_app();

        let request = Request::builder()
            .uri("/ws?staffId=w-1")
            .body(Body::empty())
            .expect("expected request to build");

        let response = app.oneshot(request).await.unwrap();

        // Missing upgrade headers are rejected before the handler runs.
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn when_assignments_route_is_called_with_get_then_returns_405() {
        let app = build_test_app();

        let request = Request::builder()
            .method("GET")
            .uri("/assignments")
            .body(Body::empty())
            .expect("expected request to build");

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
