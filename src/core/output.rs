//! Console output
//!
//! The console only ever talks to its terminal through a [`Transport`], and
//! only with plain ASCII text plus the handful of VT100 sequences defined
//! here. Cursor moves are always relative, so the console never needs to know
//! which screen column it is on.

/// Line terminator sent before the prompt and before command output
pub const NEWLINE: &[u8] = b"\r\n";

/// Sequences the console may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// CUB: ESC [ D
    CursorLeft,
    /// CUF: ESC [ C
    CursorRight,
    /// EL: ESC [ K (erase from cursor to end of line)
    ClearToEol,
    /// DECSCUSR bar cursor: ESC [ 5 SP q (insert mode)
    CursorBar,
    /// DECSCUSR underline cursor: ESC [ 3 SP q (overwrite mode)
    CursorUnderline,
}

impl Sequence {
    pub fn to_bytes(&self) -> &'static [u8] {
        match self {
            Sequence::CursorLeft => b"\x1b[D",
            Sequence::CursorRight => b"\x1b[C",
            Sequence::ClearToEol => b"\x1b[K",
            Sequence::CursorBar => b"\x1b[5 q",
            Sequence::CursorUnderline => b"\x1b[3 q",
        }
    }
}

/// Byte sink the console writes to (the serial transmitter)
///
/// Emitting is infallible from the console's point of view. A transport that
/// can fail is expected to deal with it on its own side.
pub trait Transport {
    fn emit(&mut self, bytes: &[u8]);

    fn emit_byte(&mut self, byte: u8) {
        self.emit(&[byte]);
    }

    fn emit_seq(&mut self, seq: Sequence) {
        self.emit(seq.to_bytes());
    }

    /// Move the cursor `count` columns left, one CUB at a time
    fn move_left(&mut self, count: usize) {
        for _ in 0..count {
            self.emit_seq(Sequence::CursorLeft);
        }
    }

    /// Move the cursor `count` columns right, one CUF at a time
    fn move_right(&mut self, count: usize) {
        for _ in 0..count {
            self.emit_seq(Sequence::CursorRight);
        }
    }
}

impl Transport for Vec<u8> {
    fn emit(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn emit(&mut self, bytes: &[u8]) {
        (**self).emit(bytes);
    }
}

/// Transport that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl Transport for Discard {
    fn emit(&mut self, _bytes: &[u8]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_moves() {
        let mut out = Vec::new();
        out.move_left(2);
        out.move_right(1);
        assert_eq!(out, b"\x1b[D\x1b[D\x1b[C".to_vec());
    }

    #[test]
    fn test_zero_moves_emit_nothing() {
        let mut out = Vec::new();
        out.move_left(0);
        out.move_right(0);
        assert!(out.is_empty());
    }
}
