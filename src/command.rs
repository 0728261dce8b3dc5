//! Command table and dispatch
//!
//! Commands are matched by prefix: an entry matches when its name equals the
//! leading bytes of the line. The first match in registration order wins, so
//! register longer names before their own prefixes.

use std::fmt;
use std::sync::Arc;

use crate::core::output::Transport;
use crate::history::History;

/// Column the help text starts at, counted from the command name
const HELP_NAME_WIDTH: usize = 12;

/// Command handler
///
/// Anything the handler needs beyond the line itself is captured by the
/// closure. Errors are reported back to the console, which logs them.
pub type Handler = Box<dyn Fn(&CommandContext<'_>, &mut dyn Transport) -> anyhow::Result<()> + Send + Sync>;

/// What a handler gets to see when it runs
pub struct CommandContext<'a> {
    /// The whole line as typed, command name included
    pub line: &'a [u8],
    /// Name of the matched command
    pub name: &'a [u8],
    /// Table the command was found in
    pub commands: &'a CommandTable,
    /// History of the console that dispatched the command
    pub history: &'a History,
}

impl<'a> CommandContext<'a> {
    /// Everything after the command name
    pub fn rest(&self) -> &'a [u8] {
        &self.line[self.name.len()..]
    }

    /// Space separated arguments after the command name
    pub fn args(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.rest().split(|&b| b == b' ').filter(|arg| !arg.is_empty())
    }

    /// Get argument by index (0-based)
    pub fn arg(&self, index: usize) -> Option<&'a [u8]> {
        self.args().nth(index)
    }
}

/// Command descriptor
pub struct Command {
    name: Vec<u8>,
    help: String,
    handler: Handler,
}

impl Command {
    pub fn new<F>(name: impl Into<Vec<u8>>, help: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandContext<'_>, &mut dyn Transport) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            help: help.into(),
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Whether this command's name is a prefix of `line`
    pub fn matches(&self, line: &[u8]) -> bool {
        line.starts_with(&self.name)
    }

    pub fn invoke(&self, ctx: &CommandContext<'_>, out: &mut dyn Transport) -> anyhow::Result<()> {
        (self.handler)(ctx, out)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &String::from_utf8_lossy(&self.name))
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable command list
///
/// Built once, then shared (through [`Arc`]) by every console that uses it.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command (builder style)
    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Append a command built from its parts
    pub fn register<F>(self, name: impl Into<Vec<u8>>, help: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandContext<'_>, &mut dyn Transport) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with(Command::new(name, help, handler))
    }

    /// Freeze the table for sharing
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// First command, in registration order, whose name prefixes `line`
    pub fn find(&self, line: &[u8]) -> Option<&Command> {
        self.commands.iter().find(|c| c.matches(line))
    }

    /// Write one `  name        help` row per command
    pub fn write_help(&self, out: &mut dyn Transport) {
        for command in &self.commands {
            out.emit(b"  ");
            out.emit(&command.name);
            let pad = HELP_NAME_WIDTH.saturating_sub(command.name.len()).max(1);
            for _ in 0..pad {
                out.emit_byte(b' ');
            }
            out.emit(command.help.as_bytes());
            out.emit(b"\r\n");
        }
    }
}

/// Result of dispatching a finished line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Empty line, nothing happened
    Empty,
    /// `#` comment, never executed
    Comment,
    /// A command ran (whatever its handler returned)
    Executed,
    /// No command matched
    NotFound,
}

impl Dispatch {
    /// Whether the line belongs in history
    pub fn records_history(&self) -> bool {
        matches!(self, Dispatch::Comment | Dispatch::Executed)
    }
}

/// Run `line` against `commands`, writing any output to `out`
pub fn dispatch(
    commands: &CommandTable,
    history: &History,
    line: &[u8],
    out: &mut dyn Transport,
) -> Dispatch {
    if line.is_empty() {
        return Dispatch::Empty;
    }
    if line[0] == b'#' {
        tracing::debug!("Comment line: {:?}", String::from_utf8_lossy(line));
        return Dispatch::Comment;
    }

    match commands.find(line) {
        Some(command) => {
            tracing::debug!(
                "Dispatching {:?} to {:?}",
                String::from_utf8_lossy(line),
                String::from_utf8_lossy(command.name())
            );
            out.emit(b"\r\n");
            let ctx = CommandContext {
                line,
                name: command.name(),
                commands,
                history,
            };
            if let Err(e) = command.invoke(&ctx, out) {
                tracing::warn!(
                    "Command {:?} failed: {:#}",
                    String::from_utf8_lossy(command.name()),
                    e
                );
            }
            Dispatch::Executed
        }
        None => {
            tracing::debug!("Command not found: {:?}", String::from_utf8_lossy(line));
            out.emit(b"\r\n  ERROR : command [");
            out.emit(line);
            out.emit(b"] not found");
            Dispatch::NotFound
        }
    }
}
