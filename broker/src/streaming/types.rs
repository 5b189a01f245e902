use uuid::Uuid;

use crate::error::BrokerError;

/// Identifier attached to one `Receive` call for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a subscription ended
///
/// `delivered` is the number of messages the handler accepted before the end.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The server closed the stream without an error
    Completed { delivered: u64 },
    /// The cancellation signal was observed; not a failure
    Cancelled { delivered: u64 },
    /// Opening or draining the stream failed, or the handler returned an error
    Failed { delivered: u64, error: BrokerError },
}

impl Outcome {
    pub fn delivered(&self) -> u64 {
        match self {
            Outcome::Completed { delivered }
            | Outcome::Cancelled { delivered }
            | Outcome::Failed { delivered, .. } => *delivered,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn error(&self) -> Option<&BrokerError> {
        match self {
            Outcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The single diagnostic line reported for a failed outcome
    pub fn diagnostic(&self) -> Option<String> {
        self.error().map(|error| error.to_string())
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed { delivered } => {
                write!(f, "completed after {} message(s)", delivered)
            }
            Outcome::Cancelled { delivered } => {
                write!(f, "cancelled after {} message(s)", delivered)
            }
            Outcome::Failed { delivered, error } => {
                write!(f, "failed after {} message(s): {}", delivered, error)
            }
        }
    }
}
