use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use broker::{BrokerTransport, MessageHandler, Outcome, StreamConsumer, TopicSet};
use crossterm::event::Event;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::watcher::CancelWatcher;

/// How the cancel watcher ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherEnd {
    /// The operator pressed Escape
    Cancelled,
    /// The signal was raised by the other side first
    Stopped,
    /// Reading terminal input failed or the watcher panicked
    Failed(String),
}

#[derive(Debug)]
pub struct SessionReport {
    pub outcome: Outcome,
    pub watcher: WatcherEnd,
}

/// Race one subscription against the cancel watcher
///
/// Whichever side ends first raises the shared token, and the other side is
/// awaited before returning, so neither task outlives the session.
/// `next_event` is the event source handed to [`CancelWatcher::watch_with`].
pub async fn run_session<T, H, F>(
    transport: T,
    topics: TopicSet,
    mut handler: H,
    watcher: CancelWatcher,
    next_event: F,
) -> io::Result<SessionReport>
where
    T: BrokerTransport + 'static,
    H: MessageHandler + 'static,
    F: FnMut(Duration) -> io::Result<Option<Event>> + Send + 'static,
{
    let cancel = CancellationToken::new();

    let watcher_token = cancel.clone();
    let mut watcher =
        tokio::task::spawn_blocking(move || watcher.watch_with(&watcher_token, next_event));

    let consumer_token = cancel.clone();
    let mut consumer = tokio::spawn(async move {
        let mut consumer = StreamConsumer::new(transport);
        consumer.subscribe(&topics, &mut handler, &consumer_token).await
    });

    let (outcome, watcher_end) = tokio::select! {
        outcome = &mut consumer => {
            cancel.cancel();
            (outcome, finish_watcher(watcher).await)
        }
        watched = &mut watcher => {
            let end = watcher_end(watched);
            if end == WatcherEnd::Cancelled {
                log::debug!("Operator cancelled the subscription");
            }
            cancel.cancel();
            (consumer.await, end)
        }
    };

    let outcome = outcome.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(SessionReport {
        outcome,
        watcher: watcher_end,
    })
}

async fn finish_watcher(watcher: JoinHandle<io::Result<bool>>) -> WatcherEnd {
    watcher_end(watcher.await)
}

fn watcher_end(watched: Result<io::Result<bool>, tokio::task::JoinError>) -> WatcherEnd {
    match watched {
        Ok(Ok(true)) => WatcherEnd::Cancelled,
        Ok(Ok(false)) => WatcherEnd::Stopped,
        Ok(Err(e)) => {
            log::warn!("Terminal input failed: {}", e);
            WatcherEnd::Failed(e.to_string())
        }
        Err(e) => {
            log::warn!("Cancel watcher panicked: {}", e);
            WatcherEnd::Failed(format!("cancel watcher panicked: {}", e))
        }
    }
}

/// Write at most one diagnostic line to `err` and pick the exit code
///
/// A failed subscription wins over a failed watcher when both happened.
pub fn report<W: Write>(session: &SessionReport, err: &mut W) -> ExitCode {
    log::info!("Subscription {}", session.outcome);

    let line = match (session.outcome.diagnostic(), &session.watcher) {
        (Some(diagnostic), _) => diagnostic,
        (None, WatcherEnd::Failed(reason)) => format!("Terminal input failed: {}", reason),
        (None, _) => return ExitCode::SUCCESS,
    };
    let _ = writeln!(err, "{}", line);
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use broker::proto::{ReceiveRequest, SendRequest};
    use broker::streaming::HandlerError;
    use broker::{BrokerError, BrokerResult, Message, MessageStream};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use futures::StreamExt;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// Transport serving a fixed list of messages, then closing or hanging
    struct FixedTransport {
        messages: Vec<Message>,
        hang: bool,
    }

    #[async_trait]
    impl BrokerTransport for FixedTransport {
        async fn receive(&mut self, _request: ReceiveRequest) -> BrokerResult<MessageStream> {
            let items = futures::stream::iter(
                self.messages.drain(..).map(Ok).collect::<Vec<BrokerResult<Message>>>(),
            );
            if self.hang {
                Ok(items.chain(futures::stream::pending()).boxed())
            } else {
                Ok(items.boxed())
            }
        }

        async fn send(&mut self, _request: SendRequest) -> BrokerResult<()> {
            Ok(())
        }
    }

    fn topics() -> TopicSet {
        TopicSet::new(["Channel1", "Channel2"]).unwrap()
    }

    fn esc() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
    }

    fn report_to_string(session: &SessionReport) -> (ExitCode, String) {
        let mut err = Vec::new();
        let code = report(session, &mut err);
        (code, String::from_utf8(err).unwrap())
    }

    #[tokio::test]
    async fn test_completed_stream_stops_watcher() {
        let transport = FixedTransport {
            messages: vec![Message::new("Channel1", "a"), Message::new("Channel2", "b")],
            hang: false,
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = move |message: Message| -> Result<(), HandlerError> {
            sink.lock().unwrap().push(message.content);
            Ok(())
        };
        let poll_interval = Duration::from_millis(20);
        let watcher = CancelWatcher::new().with_poll_interval(poll_interval);

        let started = Instant::now();
        let session = run_session(transport, topics(), handler, watcher, |timeout| {
            std::thread::sleep(timeout);
            Ok(None)
        })
        .await
        .unwrap();

        assert!(matches!(session.outcome, Outcome::Completed { delivered: 2 }));
        assert_eq!(session.watcher, WatcherEnd::Stopped);
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
        // The watcher notices the token after at most one more poll.
        assert!(started.elapsed() < poll_interval * 25);

        let (code, err) = report_to_string(&session);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_escape_cancels_hanging_stream() {
        let transport = FixedTransport {
            messages: vec![Message::new("Channel1", "a"), Message::new("Channel1", "b")],
            hang: true,
        };
        let (delivered_tx, delivered_rx) = mpsc::channel::<()>();
        let handler = move |_message: Message| -> Result<(), HandlerError> {
            let _ = delivered_tx.send(());
            Ok(())
        };

        // Press Escape once both messages reached the handler.
        let mut notified = 0;
        let next_event = move |timeout: Duration| -> io::Result<Option<Event>> {
            if notified < 2 {
                if delivered_rx.recv_timeout(timeout).is_ok() {
                    notified += 1;
                }
                return Ok(None);
            }
            Ok(Some(esc()))
        };

        let session = tokio::time::timeout(
            Duration::from_secs(5),
            run_session(transport, topics(), handler, CancelWatcher::new(), next_event),
        )
        .await
        .expect("session did not end after Escape")
        .unwrap();

        assert!(matches!(session.outcome, Outcome::Cancelled { delivered: 2 }));
        assert_eq!(session.watcher, WatcherEnd::Cancelled);

        let (code, err) = report_to_string(&session);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_input_failure_ends_run_as_failure() {
        let transport = FixedTransport {
            messages: Vec::new(),
            hang: true,
        };
        let handler = |_message: Message| -> Result<(), HandlerError> { Ok(()) };

        let session = tokio::time::timeout(
            Duration::from_secs(5),
            run_session(transport, topics(), handler, CancelWatcher::new(), |_| {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
            }),
        )
        .await
        .expect("session did not end after input failure")
        .unwrap();

        assert!(session.outcome.is_cancelled());
        assert!(matches!(&session.watcher, WatcherEnd::Failed(reason) if reason.contains("terminal closed")));

        let (code, err) = report_to_string(&session);
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(err, "Terminal input failed: terminal closed\n");
    }

    #[tokio::test]
    async fn test_watcher_panic_ends_run_as_failure() {
        let transport = FixedTransport {
            messages: Vec::new(),
            hang: true,
        };
        let handler = |_message: Message| -> Result<(), HandlerError> { Ok(()) };

        let session = tokio::time::timeout(
            Duration::from_secs(5),
            run_session(transport, topics(), handler, CancelWatcher::new(), |_| {
                panic!("event source gone")
            }),
        )
        .await
        .expect("session did not end after watcher panic")
        .unwrap();

        assert!(session.outcome.is_cancelled());
        assert!(matches!(session.watcher, WatcherEnd::Failed(_)));
        assert_eq!(report_to_string(&session).0, ExitCode::FAILURE);
    }

    #[test]
    fn test_report_exit_codes() {
        let completed = SessionReport {
            outcome: Outcome::Completed { delivered: 3 },
            watcher: WatcherEnd::Stopped,
        };
        assert_eq!(report_to_string(&completed), (ExitCode::SUCCESS, String::new()));

        let cancelled = SessionReport {
            outcome: Outcome::Cancelled { delivered: 1 },
            watcher: WatcherEnd::Cancelled,
        };
        assert_eq!(report_to_string(&cancelled), (ExitCode::SUCCESS, String::new()));

        let failed = SessionReport {
            outcome: Outcome::Failed {
                delivered: 0,
                error: BrokerError::Connection("http://localhost:50051: refused".to_string()),
            },
            watcher: WatcherEnd::Failed("terminal closed".to_string()),
        };
        let (code, err) = report_to_string(&failed);
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(err.lines().count(), 1);
        assert!(err.starts_with("Failed to connect to the broker"));
    }
}
