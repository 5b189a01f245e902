pub mod config;
pub mod error;
pub mod model;
pub mod proto;
pub mod publish;
pub mod streaming;
pub mod transport;

// Re-export key types for easier access
pub use config::ClientConfig;
pub use error::{BrokerError, BrokerResult};
pub use model::{Message, Topic, TopicSet};
pub use publish::Publisher;
pub use streaming::{MessageHandler, Outcome, StreamConsumer};
pub use transport::{BrokerTransport, GrpcTransport, MessageStream};
