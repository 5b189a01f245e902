//! Wire types and client stub for the `MessageBroker` gRPC service.
//!
//! Mirrors `proto/broker.proto` (no proto package, so RPC paths are
//! `/MessageBroker/<Method>`). Field tags must match that file.

use crate::model;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub topic: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub content: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendRequest {
    #[prost(message, repeated, tag = "1")]
    pub messages: ::prost::alloc::vec::Vec<Message>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SendResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReceiveRequest {
    #[prost(string, repeated, tag = "1")]
    pub topics: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReceiveResponse {
    #[prost(message, optional, tag = "1")]
    pub message: ::core::option::Option<Message>,
}

impl From<Message> for model::Message {
    fn from(message: Message) -> Self {
        model::Message::new(message.topic, message.content)
    }
}

impl From<model::Message> for Message {
    fn from(message: model::Message) -> Self {
        Self {
            topic: message.topic.into_string(),
            content: message.content,
        }
    }
}

impl From<&model::TopicSet> for ReceiveRequest {
    fn from(topics: &model::TopicSet) -> Self {
        Self {
            topics: topics.to_names(),
        }
    }
}

pub mod message_broker_client {
    use tonic::codegen::http::uri::PathAndQuery;
    use tonic::transport::Channel;

    /// Client stub for the `MessageBroker` service over a tonic channel
    #[derive(Debug, Clone)]
    pub struct MessageBrokerClient {
        inner: tonic::client::Grpc<Channel>,
    }

    impl MessageBrokerClient {
        pub fn new(channel: Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        pub async fn send(
            &mut self,
            request: impl tonic::IntoRequest<super::SendRequest>,
        ) -> Result<tonic::Response<super::SendResponse>, tonic::Status> {
            self.ready_status().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/MessageBroker/Send");
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn receive(
            &mut self,
            request: impl tonic::IntoRequest<super::ReceiveRequest>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::ReceiveResponse>>, tonic::Status>
        {
            self.ready_status().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static("/MessageBroker/Receive");
            self.inner
                .server_streaming(request.into_request(), path, codec)
                .await
        }

        /// Wait until the underlying channel is connected and can take a request
        pub async fn ready(&mut self) -> Result<(), tonic::transport::Error> {
            self.inner.ready().await
        }

        async fn ready_status(&mut self) -> Result<(), tonic::Status> {
            self.ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {}", e)))
        }
    }
}
