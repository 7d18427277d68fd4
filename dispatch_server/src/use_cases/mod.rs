// Use cases layer: assignment dispatch and expiry.

pub mod dispatcher;
pub mod types;

pub use dispatcher::{DispatchSettings, Dispatcher, spawn_expiry_watcher};
pub use types::{CreatedAssignment, NewAssignment, OutboundEvent, PassOutcome};
