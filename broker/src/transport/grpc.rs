use async_trait::async_trait;
use futures::StreamExt;
use tonic::transport::Endpoint;

use super::{BrokerTransport, MessageStream};
use crate::config::ClientConfig;
use crate::error::{describe, BrokerError, BrokerResult};
use crate::model::Message;
use crate::proto::message_broker_client::MessageBrokerClient;
use crate::proto::{ReceiveRequest, ReceiveResponse, SendRequest};

/// [`BrokerTransport`] over a tonic gRPC channel
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    client: MessageBrokerClient,
    address: String,
}

impl GrpcTransport {
    /// Connect to the broker named by `config.server_address`
    ///
    /// Fails with [`BrokerError::Connection`] if the address is malformed or
    /// the server cannot be reached within `config.connect_timeout`.
    pub async fn connect(config: &ClientConfig) -> BrokerResult<Self> {
        let endpoint = Endpoint::from_shared(config.server_address.clone())
            .map_err(|e| connection_error(&config.server_address, &e))?
            .connect_timeout(config.connect_timeout);

        log::debug!("Connecting to broker at {}", config.server_address);
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| connection_error(&config.server_address, &e))?;
        log::info!("Connected to broker at {}", config.server_address);

        Ok(Self {
            client: MessageBrokerClient::new(channel),
            address: config.server_address.clone(),
        })
    }

    /// Build a transport that connects on first use instead of up front
    ///
    /// Connection failures then surface from the first `receive` or `send`.
    pub fn connect_lazy(config: &ClientConfig) -> BrokerResult<Self> {
        let channel = Endpoint::from_shared(config.server_address.clone())
            .map_err(|e| connection_error(&config.server_address, &e))?
            .connect_timeout(config.connect_timeout)
            .connect_lazy();

        Ok(Self {
            client: MessageBrokerClient::new(channel),
            address: config.server_address.clone(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl BrokerTransport for GrpcTransport {
    async fn receive(&mut self, request: ReceiveRequest) -> BrokerResult<MessageStream> {
        self.client
            .ready()
            .await
            .map_err(|e| connection_error(&self.address, &e))?;
        let response = self
            .client
            .receive(request)
            .await
            .map_err(|status| open_error(&self.address, status))?;
        let stream = response.into_inner().map(|item| match item {
            Ok(envelope) => unwrap_envelope(envelope),
            Err(status) => Err(BrokerError::from(status)),
        });
        Ok(stream.boxed())
    }

    async fn send(&mut self, request: SendRequest) -> BrokerResult<()> {
        self.client
            .ready()
            .await
            .map_err(|e| connection_error(&self.address, &e))?;
        self.client.send(request).await?;
        Ok(())
    }
}

fn connection_error(address: &str, err: &tonic::transport::Error) -> BrokerError {
    BrokerError::Connection(format!("{}: {}", address, describe(err)))
}

/// Classify a status returned while the call is being opened
///
/// `Unavailable` before any item means the server was never reached.
fn open_error(address: &str, status: tonic::Status) -> BrokerError {
    if status.code() == tonic::Code::Unavailable {
        BrokerError::Connection(format!("{}: {}", address, status.message()))
    } else {
        BrokerError::from(status)
    }
}

fn unwrap_envelope(envelope: ReceiveResponse) -> BrokerResult<Message> {
    envelope
        .message
        .map(Message::from)
        .ok_or_else(|| BrokerError::Protocol("received an envelope without a message".to_string()))
}
