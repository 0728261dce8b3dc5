//! Console engine
//!
//! Ties the classifier, the line buffer, the history ring and the command
//! table together. The console is driven one byte at a time through
//! [`Console::feed_byte`] and writes its echo and redraws to a
//! [`Transport`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use super::escape::{Classifier, Control, EscapeState, Input};
use super::line::{InsertMode, LineBuffer};
use super::output::{Transport, NEWLINE};
use super::rx::ByteSource;
use crate::command::{self, CommandTable};
use crate::history::{Direction, History};

/// Smallest usable line buffer: one byte plus the terminator
pub const MIN_COMMAND: usize = 2;

/// Largest line buffer; positions fit a byte, as on the device
pub const MAX_COMMAND: usize = 256;

/// Largest history ring
pub const MAX_HISTORY: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("max_command must be at least 2, got {0}")]
    CommandTooShort(usize),

    #[error("max_command must be at most 256, got {0}")]
    CommandTooLong(usize),

    #[error("max_history must be at most 255, got {0}")]
    HistoryTooLarge(usize),

    #[error("prompt must be printable ASCII: {0:?}")]
    InvalidPrompt(String),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Console settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Prompt printed after every command
    pub prompt: String,
    /// Line buffer size in bytes, terminator included
    pub max_command: usize,
    /// History entries kept (0 disables history)
    pub max_history: usize,
    /// Allow the Insert key to switch to overwrite mode
    pub insert_toggle: bool,
    /// Emit DECSCUSR cursor shapes for insert/overwrite mode
    pub cursor_shape: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            max_command: 32,
            max_history: 6,
            insert_toggle: true,
            cursor_shape: true,
        }
    }
}

impl ConsoleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_command < MIN_COMMAND {
            return Err(ConsoleError::CommandTooShort(self.max_command));
        }
        if self.max_command > MAX_COMMAND {
            return Err(ConsoleError::CommandTooLong(self.max_command));
        }
        if self.max_history > MAX_HISTORY {
            return Err(ConsoleError::HistoryTooLarge(self.max_history));
        }
        if !self.prompt.bytes().all(|b| (0x20..0x7F).contains(&b)) {
            return Err(ConsoleError::InvalidPrompt(self.prompt.clone()));
        }
        Ok(())
    }
}

/// Interactive line-editing console
pub struct Console {
    settings: ConsoleSettings,
    classifier: Classifier,
    line: LineBuffer,
    history: History,
    insert_mode: InsertMode,
    commands: Arc<CommandTable>,
}

impl Console {
    /// Build a console without printing anything
    pub fn new(settings: ConsoleSettings, commands: Arc<CommandTable>) -> Result<Self> {
        settings.validate()?;

        let line = LineBuffer::new(settings.max_command);
        let history = History::new(settings.max_history, settings.max_command);

        Ok(Self {
            settings,
            classifier: Classifier::new(),
            line,
            history,
            insert_mode: InsertMode::Insert,
            commands,
        })
    }

    /// Build a console and print the first prompt
    pub fn init(
        settings: ConsoleSettings,
        commands: Arc<CommandTable>,
        out: &mut dyn Transport,
    ) -> Result<Self> {
        let console = Self::new(settings, commands)?;
        console.prompt(out);
        Ok(console)
    }

    /// Process a single received byte
    pub fn feed_byte(&mut self, byte: u8, out: &mut dyn Transport) {
        let Some(input) = self.classifier.feed(byte) else {
            return;
        };
        trace!("Input {:?} from {:#04x}", input, byte);

        match input {
            Input::Char(b) => {
                if !self.line.insert(b, self.insert_mode, out) {
                    trace!("Line full, dropped {:#04x}", b);
                }
                self.history.clear_recall();
            }
            Input::Control(control) => {
                self.control(control, out);
                if !control.is_history() {
                    self.history.clear_recall();
                }
            }
        }
    }

    /// Process a batch of bytes, in order
    pub fn feed(&mut self, bytes: &[u8], out: &mut dyn Transport) {
        for &byte in bytes {
            self.feed_byte(byte, out);
        }
    }

    /// Drain every byte currently available from `source`
    ///
    /// Returns the number of bytes consumed.
    pub fn poll(&mut self, source: &mut dyn ByteSource, out: &mut dyn Transport) -> usize {
        let mut consumed = 0;
        while let Some(byte) = source.next_byte() {
            self.feed_byte(byte, out);
            consumed += 1;
        }
        consumed
    }

    fn control(&mut self, control: Control, out: &mut dyn Transport) {
        match control {
            Control::Enter => self.execute(out),
            Control::Break => {
                debug!("Break, discarding {} bytes", self.line.len());
                self.line.reset();
                self.prompt(out);
            }
            Control::Backspace => self.line.backspace(out),
            Control::Cancel => self.line.cancel(out),
            Control::ClearLine => self.line.clear_line(out),
            Control::Home => self.line.move_home(out),
            Control::End => self.line.move_end(out),
            Control::ArrowLeft => self.line.move_left(out),
            Control::ArrowRight => self.line.move_right(out),
            Control::ArrowUp => self.recall(Direction::Previous, out),
            Control::ArrowDown => self.recall(Direction::Next, out),
            Control::InsertToggle => {
                if self.settings.insert_toggle {
                    self.insert_mode = self.insert_mode.toggled();
                    debug!("Insert mode: {:?}", self.insert_mode);
                    if self.settings.cursor_shape {
                        out.emit_seq(self.insert_mode.cursor_shape());
                    }
                }
            }
            Control::Eof | Control::PageUp | Control::PageDown => {}
        }
    }

    fn recall(&mut self, direction: Direction, out: &mut dyn Transport) {
        if let Some(entry) = self.history.recall(direction) {
            self.line.set(entry, out);
        }
    }

    fn execute(&mut self, out: &mut dyn Transport) {
        let result = command::dispatch(&self.commands, &self.history, self.line.as_bytes(), out);

        if result.records_history() && !self.history.recall_active() {
            self.history.write(self.line.as_bytes());
        }

        self.line.reset();
        self.prompt(out);
    }

    /// Print the prompt on a fresh line
    pub fn prompt(&self, out: &mut dyn Transport) {
        if self.settings.cursor_shape {
            out.emit_seq(self.insert_mode.cursor_shape());
        }
        out.emit(NEWLINE);
        out.emit(self.settings.prompt.as_bytes());
    }

    /// Current line contents
    pub fn line(&self) -> &[u8] {
        self.line.as_bytes()
    }

    pub fn cursor(&self) -> usize {
        self.line.cursor()
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn status(&self) -> EscapeState {
        self.classifier.state()
    }

    pub fn insert_mode(&self) -> InsertMode {
        self.insert_mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const PROMPT: &[u8] = b"\x1b[5 q\r\n> ";

    fn console() -> (Console, Vec<u8>) {
        let mut out = Vec::new();
        let console = Console::init(ConsoleSettings::default(), CommandTable::new().into_shared(), &mut out)
            .expect("default settings are valid");
        (console, out)
    }

    #[test]
    fn test_init_prints_prompt() {
        let (console, out) = console();
        assert_eq!(out, PROMPT.to_vec());
        assert!(console.is_empty());
        assert_eq!(console.status(), EscapeState::Idle);
    }

    #[test]
    fn test_rejects_bad_settings() {
        let commands = CommandTable::new().into_shared();
        let settings = ConsoleSettings { max_command: 1, ..Default::default() };
        assert_eq!(
            Console::new(settings, commands.clone()).err(),
            Some(ConsoleError::CommandTooShort(1))
        );

        let settings = ConsoleSettings { prompt: "\x1b[31m>".to_string(), ..Default::default() };
        assert!(matches!(Console::new(settings, commands), Err(ConsoleError::InvalidPrompt(_))));
    }

    #[test]
    fn test_rejects_oversized_buffers() {
        let commands = CommandTable::new().into_shared();

        let settings = ConsoleSettings { max_history: usize::MAX / 16, ..Default::default() };
        assert_eq!(
            Console::new(settings, commands.clone()).err(),
            Some(ConsoleError::HistoryTooLarge(usize::MAX / 16))
        );

        let settings = ConsoleSettings { max_command: usize::MAX, ..Default::default() };
        assert_eq!(
            Console::new(settings, commands.clone()).err(),
            Some(ConsoleError::CommandTooLong(usize::MAX))
        );

        let settings = ConsoleSettings {
            max_command: MAX_COMMAND,
            max_history: MAX_HISTORY,
            ..Default::default()
        };
        assert!(Console::new(settings, commands).is_ok());
    }

    #[test]
    fn test_typing_echoes() {
        let (mut console, mut out) = console();
        out.clear();
        console.feed(b"abc", &mut out);
        assert_eq!(console.line(), b"abc");
        assert_eq!(out, b"abc".to_vec());
    }

    #[test]
    fn test_break_discards_line() {
        let (mut console, mut out) = console();
        console.feed(b"abc\x03", &mut out);
        assert!(console.is_empty());
        assert!(console.history().is_empty());
        assert!(out.ends_with(PROMPT));
    }

    #[test]
    fn test_empty_enter_redraws_prompt() {
        let (mut console, mut out) = console();
        out.clear();
        console.feed_byte(b'\r', &mut out);
        assert_eq!(out, PROMPT.to_vec());
    }

    #[test]
    fn test_insert_toggle_overwrites() {
        let (mut console, mut out) = console();
        console.feed(b"abc\x1b[1~", &mut out);
        out.clear();
        console.feed(b"\x1b[2~", &mut out);
        assert_eq!(console.insert_mode(), InsertMode::Overwrite);
        assert_eq!(out, b"\x1b[3 q".to_vec());

        console.feed(b"X", &mut out);
        assert_eq!(console.line(), b"Xbc");

        console.feed(b"\x1b[2~", &mut out);
        assert_eq!(console.insert_mode(), InsertMode::Insert);
        console.feed(b"Y", &mut out);
        assert_eq!(console.line(), b"XYbc");
    }

    #[test]
    fn test_insert_toggle_disabled() {
        let settings = ConsoleSettings { insert_toggle: false, ..Default::default() };
        let mut console = Console::new(settings, CommandTable::new().into_shared()).unwrap();
        let mut out = Vec::new();
        console.feed(b"\x1b[2~", &mut out);
        assert_eq!(console.insert_mode(), InsertMode::Insert);
        assert!(out.is_empty());
    }

    #[test]
    fn test_no_cursor_shape() {
        let settings = ConsoleSettings { cursor_shape: false, ..Default::default() };
        let mut out = Vec::new();
        Console::init(settings, CommandTable::new().into_shared(), &mut out).unwrap();
        assert_eq!(out, b"\r\n> ".to_vec());
    }

    #[test]
    fn test_recalled_line_not_rewritten() {
        let (mut console, mut out) = console();
        console.feed(b"#one\r#two\r", &mut out);
        assert_eq!(console.history().len(), 2);

        // Recall and execute unchanged: no new entry
        console.feed(b"\x1b[A\r", &mut out);
        assert_eq!(console.history().len(), 2);

        // Recall, edit, execute: new entry
        console.feed(b"\x1b[A!\r", &mut out);
        assert_eq!(console.history().len(), 3);
        assert_eq!(console.history().iter().last(), Some(&b"#two!"[..]));
    }

    #[test]
    fn test_left_right_keep_recall_cleared() {
        let (mut console, mut out) = console();
        console.feed(b"#a\r#b\r", &mut out);
        console.feed(b"\x1b[A", &mut out);
        assert!(console.history().recall_active());
        console.feed(b"\x1b[D", &mut out);
        assert!(!console.history().recall_active());
    }

    #[test]
    fn test_handler_sees_history() {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let commands = CommandTable::new()
            .register("history", "Show the commands history", move |ctx, _| {
                let mut seen = sink.lock().unwrap();
                seen.extend(ctx.history.iter().map(|l| l.to_vec()));
                Ok(())
            })
            .into_shared();
        let mut out = Vec::new();
        let mut console = Console::init(ConsoleSettings::default(), commands, &mut out).unwrap();
        console.feed(b"#x\rhistory\r", &mut out);
        assert_eq!(*seen.lock().unwrap(), vec![b"#x".to_vec()]);
        assert_eq!(console.history().len(), 2);
    }
}
