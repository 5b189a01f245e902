use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::handler::MessageHandler;
use super::types::{Outcome, SubscriptionId};
use crate::error::BrokerError;
use crate::model::TopicSet;
use crate::proto::ReceiveRequest;
use crate::transport::{BrokerTransport, MessageStream};

/// Drives one subscription at a time against a broker transport
///
/// `subscribe` takes `&mut self`, so a consumer never has more than one
/// `Receive` call open. There is no retry: once `subscribe` returns, the call
/// is gone and a new `subscribe` is needed to resume.
///
/// # Example
///
/// ```rust,no_run
/// use broker::{ClientConfig, GrpcTransport, Message, StreamConsumer};
/// use broker::streaming::HandlerError;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::default();
/// let transport = GrpcTransport::connect(&config).await?;
/// let mut consumer = StreamConsumer::new(transport);
/// let cancel = CancellationToken::new();
///
/// let mut print = |message: Message| -> Result<(), HandlerError> {
///     println!("{}", message.content);
///     Ok(())
/// };
/// let outcome = consumer.subscribe(&config.topics, &mut print, &cancel).await;
/// println!("{}", outcome);
/// # Ok(())
/// # }
/// ```
pub struct StreamConsumer<T> {
    transport: T,
}

impl<T: BrokerTransport> StreamConsumer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Subscribe to `topics` and feed every delivered message to `handler`
    ///
    /// Returns when the server closes the stream, when `cancel` is raised, or
    /// on the first failure. Cancellation is checked before the call is opened
    /// and before every pull, never while the handler runs. Failures are
    /// logged once and returned inside [`Outcome::Failed`].
    pub async fn subscribe<H>(
        &mut self,
        topics: &TopicSet,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> Outcome
    where
        H: MessageHandler + ?Sized,
    {
        let subscription_id = SubscriptionId::new();

        if cancel.is_cancelled() {
            log::debug!("Subscription {} cancelled before it was opened", subscription_id);
            return Outcome::Cancelled { delivered: 0 };
        }

        log::debug!("Subscription {} opening for topics [{}]", subscription_id, topics);
        let request = ReceiveRequest::from(topics);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.transport.receive(request) => Some(result),
        };

        let stream = match opened {
            None => {
                log::debug!("Subscription {} cancelled while opening", subscription_id);
                return Outcome::Cancelled { delivered: 0 };
            }
            Some(Err(error)) => return fail(subscription_id, 0, error),
            Some(Ok(stream)) => stream,
        };

        drain(subscription_id, stream, handler, cancel).await
    }
}

async fn drain<H>(
    subscription_id: SubscriptionId,
    mut stream: MessageStream,
    handler: &mut H,
    cancel: &CancellationToken,
) -> Outcome
where
    H: MessageHandler + ?Sized,
{
    let mut delivered: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!(
                    "Subscription {} cancelled after {} message(s)",
                    subscription_id,
                    delivered
                );
                return Outcome::Cancelled { delivered };
            }
            item = stream.next() => item,
        };

        match next {
            None => {
                log::debug!(
                    "Subscription {} completed after {} message(s)",
                    subscription_id,
                    delivered
                );
                return Outcome::Completed { delivered };
            }
            Some(Err(error)) => return fail(subscription_id, delivered, error),
            Some(Ok(message)) => {
                log::trace!(
                    "Subscription {} received message on topic '{}'",
                    subscription_id,
                    message.topic
                );
                if let Err(e) = handler.on_message(message) {
                    return fail(subscription_id, delivered, BrokerError::Handler(e.to_string()));
                }
                delivered += 1;
            }
        }
    }
}

fn fail(subscription_id: SubscriptionId, delivered: u64, error: BrokerError) -> Outcome {
    log::error!("Subscription {} failed: {}", subscription_id, error);
    Outcome::Failed { delivered, error }
}
