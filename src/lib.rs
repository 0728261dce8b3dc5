//! vtconsole - a VT100 line-editing console
//!
//! The console consumes the raw byte stream of a serial terminal one byte at
//! a time, edits a fixed-size command line with relative cursor redraws, keeps
//! a small history ring, and dispatches finished lines to registered commands
//! by prefix match.
//!
//! ```
//! use vtconsole::{CommandTable, Console, ConsoleSettings, Transport};
//!
//! let commands = CommandTable::new()
//!     .register("echo", "Print the arguments", |ctx, out| {
//!         out.emit(ctx.rest());
//!         Ok(())
//!     })
//!     .into_shared();
//!
//! let mut out = Vec::new();
//! let mut console = Console::init(ConsoleSettings::default(), commands, &mut out)?;
//! console.feed(b"echo hi\r", &mut out);
//! assert!(console.is_empty());
//! # Ok::<(), vtconsole::ConsoleError>(())
//! ```

pub mod command;
pub mod config;
pub mod core;
pub mod history;
pub mod ui;

pub use crate::command::{Command, CommandContext, CommandTable, Dispatch};
pub use crate::config::{Config, ConfigError};
pub use crate::core::console::{Console, ConsoleError, ConsoleSettings};
pub use crate::core::escape::{Control, EscapeState, Input};
pub use crate::core::line::InsertMode;
pub use crate::core::output::{Sequence, Transport};
pub use crate::core::rx::{rx_queue, ByteSource, RxConsumer, RxProducer};
pub use crate::core::session::Session;
pub use crate::history::{Direction, History};
