use crate::model::Message;

/// Error a message handler can return to abandon the subscription
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives each delivered message, in server emission order
///
/// The consumer waits for `on_message` to return before it pulls the next
/// message. Returning an error ends the subscription with a failed outcome;
/// the message is not redelivered.
pub trait MessageHandler: Send {
    fn on_message(&mut self, message: Message) -> Result<(), HandlerError>;
}

impl<F> MessageHandler for F
where
    F: FnMut(Message) -> Result<(), HandlerError> + Send,
{
    fn on_message(&mut self, message: Message) -> Result<(), HandlerError> {
        self(message)
    }
}
