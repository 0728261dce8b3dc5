//! Host terminal input and output.
//!
//! - **keymapper**: keyboard events to the bytes a VT220 terminal sends
//! - **terminal**: raw mode handling and the stdout transport

pub mod keymapper;
pub mod terminal;

pub use keymapper::{KeyMapper, Modifiers};
pub use terminal::{read_key, StdoutTransport, Terminal};
