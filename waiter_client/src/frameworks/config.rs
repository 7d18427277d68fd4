use std::{env, time::Duration};

// Runtime constants and environment-driven settings for the waiter client.

pub fn dispatch_ws_url() -> String {
    env::var("DISPATCH_WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:3004/ws".to_string())
}

pub fn dispatch_http_url() -> String {
    env::var("DISPATCH_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:3004".to_string())
}

pub fn staff_id() -> Option<String> {
    env::var("WAITER_STAFF_ID")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn timeout_grace() -> Duration {
    millis_from_env("ASSIGNMENT_TIMEOUT_GRACE_MS", 2000)
}

pub fn reconnect_initial_backoff() -> Duration {
    millis_from_env("RECONNECT_INITIAL_BACKOFF_MS", 500)
}

pub fn reconnect_max_backoff() -> Duration {
    millis_from_env("RECONNECT_MAX_BACKOFF_MS", 10_000)
}

pub fn http_request_timeout() -> Duration {
    millis_from_env("HTTP_REQUEST_TIMEOUT_MS", 1500)
}

fn millis_from_env(key: &str, default: u64) -> Duration {
    let millis = env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_millis(millis)
}

pub const EVENT_CHANNEL_CAPACITY: usize = 64;
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;
pub const DECISION_CHANNEL_CAPACITY: usize = 32;
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;
