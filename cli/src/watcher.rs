use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tokio_util::sync::CancellationToken;

/// What the watcher does with one terminal event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    Cancel,
    Ignore,
}

/// Turns an Escape key press into the cancellation signal
///
/// Escape only counts while the terminal has focus. Focus changes are
/// reported by the terminal once focus reporting is enabled (see
/// [`crate::terminal::TerminalGuard`]); until the first report the terminal
/// is assumed to be focused, since it is the one the program was started from.
#[derive(Debug)]
pub struct CancelWatcher {
    focused: bool,
    poll_interval: Duration,
}

impl Default for CancelWatcher {
    fn default() -> Self {
        Self {
            focused: true,
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl CancelWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long a single wait for terminal input lasts before the token is rechecked
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn handle_event(&mut self, event: &Event) -> WatchAction {
        match event {
            Event::FocusGained => {
                self.focused = true;
                WatchAction::Ignore
            }
            Event::FocusLost => {
                self.focused = false;
                WatchAction::Ignore
            }
            Event::Key(key) if self.focused && is_cancel_key(key) => WatchAction::Cancel,
            _ => WatchAction::Ignore,
        }
    }

    /// Block on `next_event` until the operator cancels or `cancel` is raised elsewhere
    ///
    /// `next_event` waits at most the given duration and yields `None` on
    /// timeout; [`terminal_event`] is the real source. Returns `Ok(true)` if
    /// this watcher raised the signal and `Ok(false)` if it stopped because the
    /// signal was already raised.
    pub fn watch_with<F>(mut self, cancel: &CancellationToken, mut next_event: F) -> io::Result<bool>
    where
        F: FnMut(Duration) -> io::Result<Option<Event>>,
    {
        while !cancel.is_cancelled() {
            let Some(event) = next_event(self.poll_interval)? else {
                continue;
            };
            if self.handle_event(&event) == WatchAction::Cancel {
                log::info!("Cancellation requested from the terminal");
                cancel.cancel();
                return Ok(true);
            }
        }
        log::debug!("Cancel watcher stopped");
        Ok(false)
    }
}

/// Wait up to `timeout` for the next terminal event
pub fn terminal_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

fn is_cancel_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc && key.kind == KeyEventKind::Press
}
