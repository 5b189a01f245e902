/// Error types for broker client operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    #[error("Failed to connect to the broker: {0}")]
    Connection(String),

    #[error("Got an error while getting data from the service: {0}")]
    Stream(String),

    #[error("Malformed response from the service: {0}")]
    Protocol(String),

    #[error("Message handler failed: {0}")]
    Handler(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<tonic::Status> for BrokerError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message();
        if message.is_empty() {
            BrokerError::Stream(format!("{:?}", status.code()))
        } else {
            BrokerError::Stream(format!("{:?}: {}", status.code(), message))
        }
    }
}

impl From<tonic::transport::Error> for BrokerError {
    fn from(err: tonic::transport::Error) -> Self {
        BrokerError::Connection(describe(&err))
    }
}

/// Render an error with its chain of sources on one line
pub(crate) fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Result type for broker operations
pub type BrokerResult<T> = std::result::Result<T, BrokerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_keeps_reason() {
        let err = BrokerError::from(tonic::Status::unavailable("connection reset"));
        assert!(matches!(err, BrokerError::Stream(_)));
        assert!(err.to_string().contains("connection reset"));
        assert!(err.to_string().contains("Unavailable"));
    }

    #[test]
    fn test_status_conversion_without_message() {
        let err = BrokerError::from(tonic::Status::new(tonic::Code::Aborted, ""));
        assert_eq!(
            err.to_string(),
            "Got an error while getting data from the service: Aborted"
        );
    }

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "transport error")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_describe_includes_sources() {
        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(describe(&err), "transport error: connection refused");
    }

    #[test]
    fn test_error_messages() {
        let handler_err = BrokerError::Handler("sink closed".to_string());
        assert!(handler_err.to_string().contains("sink closed"));

        let config_err = BrokerError::InvalidConfiguration("no topics".to_string());
        assert!(matches!(config_err, BrokerError::InvalidConfiguration(_)));
    }
}
