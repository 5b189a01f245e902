use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BrokerError, BrokerResult};
use crate::model::{Topic, TopicSet};

/// Address the broker listens on out of the box
pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:50051";

/// Topics subscribed to when nothing else is configured
pub const DEFAULT_TOPICS: [&str; 2] = ["Channel1", "Channel2"];

/// Configuration for the broker client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URI of the broker, e.g. `http://localhost:50051`
    pub server_address: String,
    /// Topics to subscribe to, in request order
    pub topics: TopicSet,
    /// Upper bound for establishing the connection
    pub connect_timeout: Duration,
    /// Verbosity of the client log
    pub log_level: log::LevelFilter,
    /// Where the client log is written; `None` picks a file in the temp directory
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            topics: TopicSet::from_non_empty(
                DEFAULT_TOPICS.iter().map(|name| Topic::new(*name)).collect(),
            ),
            connect_timeout: Duration::from_secs(5),
            log_level: log::LevelFilter::Info,
            log_file: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the defaults overlaid with environment variables
    ///
    /// Recognised variables:
    /// - `BROKER_ADDRESS`: server URI
    /// - `BROKER_TOPICS`: comma-separated topic list
    /// - `BROKER_LOG_LEVEL`: `off`, `error`, `warn`, `info`, `debug` or `trace`
    /// - `BROKER_LOG_FILE`: path of the log file
    pub fn from_env() -> BrokerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> BrokerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(address) = lookup("BROKER_ADDRESS") {
            config = config.with_server_address(address)?;
        }
        if let Some(topics) = lookup("BROKER_TOPICS") {
            let names: Vec<String> = topics
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            config = config.with_topics(names)?;
        }
        if let Some(level) = lookup("BROKER_LOG_LEVEL") {
            let level = level.parse::<log::LevelFilter>().map_err(|_| {
                BrokerError::InvalidConfiguration(format!("Unknown log level '{}'", level))
            })?;
            config.log_level = level;
        }
        if let Some(path) = lookup("BROKER_LOG_FILE") {
            config.log_file = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the server address with validation
    pub fn with_server_address(mut self, address: impl Into<String>) -> BrokerResult<Self> {
        let address = address.into();
        validate_address(&address)?;
        self.server_address = address;
        Ok(self)
    }

    /// Set the subscribed topics, rejecting an empty list
    pub fn with_topics<I, T>(mut self, topics: I) -> BrokerResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Topic>,
    {
        self.topics = TopicSet::new(topics)?;
        Ok(self)
    }

    /// Set the connect timeout with validation
    pub fn with_connect_timeout(mut self, timeout: Duration) -> BrokerResult<Self> {
        if timeout.is_zero() {
            return Err(BrokerError::InvalidConfiguration(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }
        self.connect_timeout = timeout;
        Ok(self)
    }

    /// Log file location, defaulting to `broker-client.log` in the temp directory
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("broker-client.log"))
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> BrokerResult<()> {
        validate_address(&self.server_address)?;
        if self.connect_timeout.is_zero() {
            return Err(BrokerError::InvalidConfiguration(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_address(address: &str) -> BrokerResult<()> {
    if !(address.starts_with("http://") || address.starts_with("https://")) {
        return Err(BrokerError::InvalidConfiguration(format!(
            "Server address '{}' must start with http:// or https://",
            address
        )));
    }
    if address.trim_start_matches("https://").trim_start_matches("http://").is_empty() {
        return Err(BrokerError::InvalidConfiguration(
            "Server address is missing a host".to_string(),
        ));
    }
    Ok(())
}
