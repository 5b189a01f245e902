use crate::error::{BrokerError, BrokerResult};

/// Name of a delivery channel on the broker. Case-sensitive and otherwise opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  /// Returns the topic name as a string slice
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl std::fmt::Display for Topic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl AsRef<str> for Topic {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl From<&str> for Topic {
  fn from(name: &str) -> Self {
    Self::new(name)
  }
}

impl From<String> for Topic {
  fn from(name: String) -> Self {
    Self(name)
  }
}

/// Non-empty, ordered list of topics a subscription is opened for.
///
/// Duplicates are kept as given; the order only matters for building the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet(Vec<Topic>);

impl TopicSet {
  /// Creates a topic set, rejecting an empty list
  pub fn new<I, T>(topics: I) -> BrokerResult<Self>
  where
    I: IntoIterator<Item = T>,
    T: Into<Topic>,
  {
    let topics: Vec<Topic> = topics.into_iter().map(Into::into).collect();
    if topics.is_empty() {
      return Err(BrokerError::InvalidConfiguration(
        "At least one topic must be provided".to_string(),
      ));
    }
    Ok(Self(topics))
  }

  /// Caller guarantees `topics` is non-empty
  pub(crate) fn from_non_empty(topics: Vec<Topic>) -> Self {
    debug_assert!(!topics.is_empty());
    Self(topics)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Always false; kept for API symmetry with `len`
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Topic names in request order
  pub fn to_names(&self) -> Vec<String> {
    self.0.iter().map(|t| t.as_str().to_string()).collect()
  }
}

impl std::fmt::Display for TopicSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let names: Vec<&str> = self.0.iter().map(Topic::as_str).collect();
    write!(f, "{}", names.join(", "))
  }
}
