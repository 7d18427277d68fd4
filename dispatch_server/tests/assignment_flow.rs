mod support;

use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_health() {
    let base_url = support::ensure_server();

    let res = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_connected_candidates_receive_offer_and_first_accept_wins() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let first = support::staff_id("first");
    let second = support::staff_id("second");
    let mut first_socket = support::connect_staff(base_url, &first).await;
    let mut second_socket = support::connect_staff(base_url, &second).await;

    let assignment_id =
        support::create_assignment(&client, base_url, &[&first, &second], 60_000).await;

    let offer = support::next_event(&mut first_socket).await;
    assert_eq!(offer["event"], "order:assignment-request");
    assert_eq!(offer["data"]["assignmentId"], assignment_id.as_str());
    assert_eq!(offer["data"]["position"], 1);
    assert_eq!(offer["data"]["totalWaiters"], 2);
    assert_eq!(offer["data"]["order"]["orderNumber"], "ORD-IT");
    let second_offer = support::next_event(&mut second_socket).await;
    assert_eq!(second_offer["data"]["position"], 2);

    let accepted = client
        .post(format!("{base_url}/assignments/{assignment_id}/accept"))
        .json(&json!({ "staffId": first }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(accepted.status(), reqwest::StatusCode::OK);

    let late = client
        .post(format!("{base_url}/assignments/{assignment_id}/accept"))
        .json(&json!({ "staffId": second }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(late.status(), reqwest::StatusCode::CONFLICT);

    let timeout = support::next_event(&mut second_socket).await;
    assert_eq!(
        timeout,
        json!({
            "event": "order:assignment-timeout",
            "data": { "assignmentId": assignment_id, "orderNumber": "ORD-IT" }
        })
    );
}

#[tokio::test]
async fn test_offline_candidate_gets_offer_repushed_on_connect() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let staff = support::staff_id("late");

    let assignment_id = support::create_assignment(&client, base_url, &[&staff], 60_000).await;
    let mut socket = support::connect_staff(base_url, &staff).await;

    let offer = support::next_event(&mut socket).await;
    assert_eq!(offer["event"], "order:assignment-request");
    assert_eq!(offer["data"]["assignmentId"], assignment_id.as_str());
    let remaining = offer["data"]["timeout"].as_u64().expect("timeout ms");
    assert!(remaining > 0 && remaining <= 60_000);
}

#[tokio::test]
async fn test_server_timeout_notifies_candidates() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let staff = support::staff_id("slow");
    let mut socket = support::connect_staff(base_url, &staff).await;

    let assignment_id = support::create_assignment(&client, base_url, &[&staff], 200).await;

    let offer = support::next_event(&mut socket).await;
    assert_eq!(offer["event"], "order:assignment-request");
    let timeout = support::next_event(&mut socket).await;
    assert_eq!(timeout["event"], "order:assignment-timeout");
    assert_eq!(timeout["data"]["assignmentId"], assignment_id.as_str());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let late = client
        .post(format!("{base_url}/assignments/{assignment_id}/accept"))
        .json(&json!({ "staffId": staff }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(late.status(), reqwest::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_non_candidate_cannot_accept() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let staff = support::staff_id("owner");

    let assignment_id = support::create_assignment(&client, base_url, &[&staff], 60_000).await;

    let res = client
        .post(format!("{base_url}/assignments/{assignment_id}/accept"))
        .json(&json!({ "staffId": "intruder" }))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);
}
