use crate::error::{BrokerError, BrokerResult};
use crate::model::{Message, Topic};
use crate::proto::{self, SendRequest};
use crate::transport::BrokerTransport;

/// Publishes messages to broker topics through the `Send` call
pub struct Publisher<T> {
    transport: T,
}

impl<T: BrokerTransport> Publisher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Send a batch of messages in one request
    ///
    /// The broker fans each message out to the current subscribers of its
    /// topic. An empty batch is rejected without contacting the server.
    pub async fn publish(&mut self, messages: Vec<Message>) -> BrokerResult<()> {
        if messages.is_empty() {
            return Err(BrokerError::InvalidConfiguration(
                "At least one message must be published".to_string(),
            ));
        }

        let count = messages.len();
        let request = SendRequest {
            messages: messages.into_iter().map(proto::Message::from).collect(),
        };
        self.transport.send(request).await.map_err(|e| {
            log::error!("Failed to publish {} message(s): {}", count, e);
            e
        })?;
        log::debug!("Published {} message(s)", count);
        Ok(())
    }

    /// Publish a single message to `topic`
    pub async fn publish_to(
        &mut self,
        topic: impl Into<Topic>,
        content: impl Into<String>,
    ) -> BrokerResult<()> {
        self.publish(vec![Message::new(topic, content)]).await
    }
}
