use std::{env, time::Duration};

// Runtime/server constants.

pub fn http_port() -> u16 {
    env::var("DISPATCH_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3004)
}

pub fn default_assignment_timeout() -> Duration {
    let millis = env::var("DISPATCH_DEFAULT_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .unwrap_or(30_000);
    Duration::from_millis(millis)
}

pub const OUTBOX_CAPACITY: usize = 64;
// Settled ids kept so late accepts get a 409 "already resolved" instead of "not found".
pub const RESOLVED_MEMORY: usize = 1024;
