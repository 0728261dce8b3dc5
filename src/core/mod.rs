//! Core console components.
//!
//! - **escape**: input byte classifier (C0 controls and VT100 sequences)
//! - **line**: fixed-size edit buffer with minimal redraw
//! - **output**: transport trait and the escape sequences the console emits
//! - **console**: the engine tying input, editing, history and dispatch together
//! - **rx**: single-producer, single-consumer receive queue
//! - **session**: host harness running a reader thread into the queue
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── RxConsumer (bytes from the reader thread)
//! └── Console
//!     ├── Classifier (escape state machine)
//!     ├── LineBuffer (edit buffer + cursor)
//!     ├── History (ring of executed lines)
//!     └── CommandTable (shared, prefix matched)
//! ```

pub mod console;
pub mod escape;
pub mod line;
pub mod output;
pub mod rx;
pub mod session;

pub use console::{Console, ConsoleError, ConsoleSettings, MAX_COMMAND, MAX_HISTORY, MIN_COMMAND};
pub use escape::{Classifier, Control, EscapeState, Input};
pub use line::{InsertMode, LineBuffer};
pub use output::{Discard, Sequence, Transport, NEWLINE};
pub use rx::{rx_queue, ByteSource, RxConsumer, RxProducer};
pub use session::Session;
