// Domain layer: assignments, their candidates and dispatch errors.

pub mod assignment;
pub mod errors;

pub use assignment::{Assignment, OrderItem, OrderSummary};
pub use errors::DispatchError;
