use std::io::{self, Write};

use broker::streaming::{HandlerError, MessageHandler};
use broker::Message;

/// Writes each message's content as one line
///
/// In raw mode the terminal does not translate `\n`, so the line ending is
/// configurable.
pub struct ConsoleHandler<W> {
    out: W,
    line_ending: &'static str,
}

impl<W: Write + Send> ConsoleHandler<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            line_ending: "\n",
        }
    }

    /// Handler for a terminal in raw mode
    pub fn raw(out: W) -> Self {
        Self {
            out,
            line_ending: "\r\n",
        }
    }

    /// Raw-mode line endings only when `out` is the terminal itself
    ///
    /// Redirected output keeps plain `\n` so files and pipes get clean lines.
    pub fn for_output(out: W, is_terminal: bool) -> Self {
        if is_terminal {
            Self::raw(out)
        } else {
            Self::new(out)
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, content: &str) -> io::Result<()> {
        write!(self.out, "{}{}", content, self.line_ending)?;
        self.out.flush()
    }
}

impl<W: Write + Send> MessageHandler for ConsoleHandler<W> {
    fn on_message(&mut self, message: Message) -> Result<(), HandlerError> {
        self.write_line(message.content())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_one_line_per_message_in_order() {
        let mut handler = ConsoleHandler::new(Vec::new());
        handler.on_message(Message::new("Channel1", "hello")).unwrap();
        handler.on_message(Message::new("Channel2", "world")).unwrap();

        let output = String::from_utf8(handler.into_inner()).unwrap();
        assert_eq!(output, "hello\nworld\n");
    }

    #[test]
    fn test_raw_mode_line_ending() {
        let mut handler = ConsoleHandler::raw(Vec::new());
        handler.on_message(Message::new("Channel1", "hello")).unwrap();

        assert_eq!(handler.into_inner(), b"hello\r\n");
    }

    #[test]
    fn test_redirected_output_keeps_plain_newlines() {
        let mut piped = ConsoleHandler::for_output(Vec::new(), false);
        piped.on_message(Message::new("Channel1", "hello")).unwrap();
        assert_eq!(piped.into_inner(), b"hello\n");

        let mut tty = ConsoleHandler::for_output(Vec::new(), true);
        tty.on_message(Message::new("Channel1", "hello")).unwrap();
        assert_eq!(tty.into_inner(), b"hello\r\n");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut handler = ConsoleHandler::new(ClosedSink);
        let err = handler.on_message(Message::new("Channel1", "hello")).unwrap_err();
        assert!(err.to_string().contains("stdout closed"));
    }
}
