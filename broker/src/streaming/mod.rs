pub mod consumer;
pub mod handler;
pub mod types;

// Re-export key types for easier access
pub use consumer::StreamConsumer;
pub use handler::{HandlerError, MessageHandler};
pub use types::{Outcome, SubscriptionId};
