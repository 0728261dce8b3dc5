//! VT input sequence classifier
//!
//! Turns the byte stream a VT100/VT220 terminal sends into printable
//! characters and editing controls. The classifier is a pure state machine:
//! it never touches the line buffer.

/// Editing control resolved from one or more input bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// CR
    Enter,
    /// Ctrl+C
    Break,
    /// Ctrl+D (ignored)
    Eof,
    /// BS or DEL
    Backspace,
    /// Ctrl+X or ESC [ 3 ~ (delete the character under the cursor)
    Cancel,
    /// ESC ESC
    ClearLine,
    End,
    Home,
    InsertToggle,
    /// ignored
    PageUp,
    /// ignored
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowRight,
    ArrowLeft,
}

impl Control {
    /// History navigation keeps a recalled line marked as recalled
    pub fn is_history(&self) -> bool {
        matches!(self, Control::ArrowUp | Control::ArrowDown)
    }
}

/// Classified input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Printable byte in [0x20, 0x7F)
    Char(u8),
    Control(Control),
}

/// Parser state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapeState {
    #[default]
    Idle,
    /// ESC received
    Esc,
    /// ESC [
    Csi,
    /// ESC O
    Ss3,
    /// ESC [ <digit>, waiting for the closing `~`
    Param7E(Control),
}

const ESC: u8 = 0x1B;

/// Classify one byte against the current state.
///
/// Returns the resolved input (if the byte completed one) and the next state.
pub fn classify(state: EscapeState, byte: u8) -> (Option<Input>, EscapeState) {
    // C0 controls win over any partial sequence
    let control = match byte {
        0x0D => Some(Control::Enter),
        0x03 => Some(Control::Break),
        0x04 => Some(Control::Eof),
        0x08 | 0x7F => Some(Control::Backspace),
        0x18 => Some(Control::Cancel),
        _ => None,
    };
    if let Some(control) = control {
        return (Some(Input::Control(control)), EscapeState::Idle);
    }

    if byte == ESC {
        return match state {
            EscapeState::Esc => (Some(Input::Control(Control::ClearLine)), EscapeState::Idle),
            // A lone ESC starts over, whatever was pending
            _ => (None, EscapeState::Esc),
        };
    }

    match state {
        EscapeState::Idle => {
            if (0x20..0x7F).contains(&byte) {
                (Some(Input::Char(byte)), EscapeState::Idle)
            } else {
                (None, EscapeState::Idle)
            }
        }
        EscapeState::Esc => match byte {
            b'[' => (None, EscapeState::Csi),
            b'O' => (None, EscapeState::Ss3),
            _ => (None, EscapeState::Idle),
        },
        EscapeState::Ss3 => match byte {
            b'F' => (Some(Input::Control(Control::End)), EscapeState::Idle),
            _ => (None, EscapeState::Idle),
        },
        EscapeState::Csi => {
            let pending = match byte {
                b'1' => Control::Home,
                b'2' => Control::InsertToggle,
                b'3' => Control::Cancel,
                b'4' => Control::End,
                b'5' => Control::PageUp,
                b'6' => Control::PageDown,
                b'A' => return (Some(Input::Control(Control::ArrowUp)), EscapeState::Idle),
                b'B' => return (Some(Input::Control(Control::ArrowDown)), EscapeState::Idle),
                b'C' => return (Some(Input::Control(Control::ArrowRight)), EscapeState::Idle),
                b'D' => return (Some(Input::Control(Control::ArrowLeft)), EscapeState::Idle),
                _ => return (None, EscapeState::Idle),
            };
            (None, EscapeState::Param7E(pending))
        }
        EscapeState::Param7E(pending) => match byte {
            b'~' => (Some(Input::Control(pending)), EscapeState::Idle),
            _ => (None, EscapeState::Idle),
        },
    }
}

/// Stateful wrapper around [`classify`]
#[derive(Debug, Default)]
pub struct Classifier {
    state: EscapeState,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a single byte
    pub fn feed(&mut self, byte: u8) -> Option<Input> {
        let (input, next) = classify(self.state, byte);
        if next == EscapeState::Idle && self.state != EscapeState::Idle && input.is_none() {
            tracing::trace!("Dropped sequence byte {:#04x} in {:?}", byte, self.state);
        }
        self.state = next;
        input
    }

    pub fn state(&self) -> EscapeState {
        self.state
    }
}
