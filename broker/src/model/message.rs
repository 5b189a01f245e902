use super::Topic;

/// A message delivered by the broker.
///
/// Values are handed to the message handler once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub topic: Topic,
  pub content: String,
}

impl Message {
  pub fn new(topic: impl Into<Topic>, content: impl Into<String>) -> Self {
    Self {
      topic: topic.into(),
      content: content.into(),
    }
  }

  pub fn content(&self) -> &str {
    &self.content
  }
}
