use crate::use_cases::Dispatcher;
use std::sync::Arc;
use tokio::sync::Mutex;

// Shared application state for the HTTP and WebSocket handlers.
pub struct AppState {
    pub dispatcher: Arc<Mutex<Dispatcher>>,
    /// Per-connection outbox buffer.
    pub outbox_capacity: usize,
}
