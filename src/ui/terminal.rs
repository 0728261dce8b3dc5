//! Host terminal
//!
//! Puts the local terminal in raw mode so every key reaches the console
//! untranslated, and implements [`Transport`] over stdout.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{self, Event};
use crossterm::{execute, terminal};
use tracing::{debug, warn};

use super::keymapper::KeyMapper;
use crate::core::output::Transport;

/// Raw-mode terminal session, restored on drop
pub struct Terminal {
    initialized: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    /// Enter raw mode
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.initialized = true;
        debug!("Raw mode enabled");
        Ok(())
    }

    /// Leave raw mode and restore the default cursor
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();
        let _ = execute!(stdout, SetCursorStyle::DefaultUserShape);
        write!(stdout, "\r\n")?;
        stdout.flush()?;
        terminal::disable_raw_mode()
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Wait up to `timeout` for a key and return the bytes it sends.
///
/// Returns an empty vec when nothing (or nothing mappable) arrived.
pub fn read_key(timeout: Duration) -> io::Result<Vec<u8>> {
    if !event::poll(timeout)? {
        return Ok(Vec::new());
    }
    match event::read()? {
        Event::Key(key_event) => Ok(KeyMapper::map_key(&key_event)),
        _ => Ok(Vec::new()),
    }
}

/// Transport writing to stdout
///
/// Write failures are logged once and the output dropped; the console never
/// sees them.
pub struct StdoutTransport {
    stdout: io::Stdout,
    failed: bool,
}

impl StdoutTransport {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            failed: false,
        }
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.stdout.flush() {
            self.report(e);
        }
    }

    fn report(&mut self, e: io::Error) {
        if !self.failed {
            warn!("Terminal write failed: {}", e);
            self.failed = true;
        }
    }
}

impl Default for StdoutTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for StdoutTransport {
    fn emit(&mut self, bytes: &[u8]) {
        match self.stdout.write_all(bytes) {
            Ok(()) => self.failed = false,
            Err(e) => self.report(e),
        }
    }
}
