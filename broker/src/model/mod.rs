mod message;
mod topic;

pub use message::Message;
pub use topic::{Topic, TopicSet};
