// Domain layer: offers, the pending queue, notifications and ports.

pub mod notification;
pub mod offer;
pub mod ports;
pub mod queue;

pub use notification::{Notification, NotificationLevel};
pub use offer::{
    AssignmentId, AssignmentOffer, AssignmentRequest, AssignmentTimeout, OrderItem, OrderSummary,
    PushEvent, Resolution, TimeoutSource,
};
pub use ports::{DecisionError, DecisionSink, Notifier, PushChannel, Subscription};
pub use queue::{AssignmentQueue, EnqueueOutcome, RemovedOffer};
