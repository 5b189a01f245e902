pub mod grpc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::BrokerResult;
use crate::model::Message;
use crate::proto::{ReceiveRequest, SendRequest};

pub use grpc::GrpcTransport;

/// Messages of one open `Receive` call, in server emission order.
///
/// The stream ends with `None` when the server closes the call cleanly; an
/// `Err` item reports a transport or protocol failure and is the last item
/// the consumer reads.
pub type MessageStream = BoxStream<'static, BrokerResult<Message>>;

/// Connection to a message broker
///
/// This is the seam between the stream consumer and the network. The gRPC
/// implementation lives in [`GrpcTransport`]; tests drive the consumer with
/// in-memory implementations.
#[async_trait]
pub trait BrokerTransport: Send {
    /// Open a server-streaming `Receive` call for the topics in `request`
    ///
    /// Dropping the returned stream aborts the call.
    async fn receive(&mut self, request: ReceiveRequest) -> BrokerResult<MessageStream>;

    /// Publish a batch of messages through the unary `Send` call
    async fn send(&mut self, request: SendRequest) -> BrokerResult<()>;
}
