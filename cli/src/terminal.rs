use std::io;

use crossterm::event::{DisableFocusChange, EnableFocusChange};
use crossterm::{execute, terminal};

/// Keeps the terminal in raw mode with focus reporting while alive
///
/// Raw mode delivers single key presses without waiting for Enter; focus
/// reporting lets the cancel watcher tell whether the terminal is focused.
/// Both are undone on drop.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnableFocusChange) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        log::debug!("Terminal switched to raw mode with focus reporting");
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableFocusChange);
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("Failed to restore terminal mode: {}", e);
        }
    }
}
