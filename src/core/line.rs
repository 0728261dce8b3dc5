//! Editable command line
//!
//! Fixed-capacity byte buffer with a cursor. Every edit is paired with the
//! smallest redraw that brings the terminal line back in sync: the echoed
//! byte, or clear-to-end-of-line plus the shifted suffix and relative moves
//! back to the cursor.

use super::output::{Sequence, Transport};

/// Character insertion mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertMode {
    #[default]
    Insert,
    Overwrite,
}

impl InsertMode {
    pub fn toggled(self) -> Self {
        match self {
            InsertMode::Insert => InsertMode::Overwrite,
            InsertMode::Overwrite => InsertMode::Insert,
        }
    }

    /// Cursor shape advertising this mode
    pub fn cursor_shape(self) -> Sequence {
        match self {
            InsertMode::Insert => Sequence::CursorBar,
            InsertMode::Overwrite => Sequence::CursorUnderline,
        }
    }
}

/// Line buffer
///
/// Holds at most `capacity - 1` bytes; `buf[len]` is always 0.
pub struct LineBuffer {
    buf: Box<[u8]>,
    /// Cursor position
    cursor: usize,
    /// Line length
    len: usize,
}

impl LineBuffer {
    /// Create an empty buffer of `capacity` bytes (terminator included)
    ///
    /// `capacity` must be at least 1; the console validates this before
    /// building one.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            cursor: 0,
            len: 0,
        }
    }

    /// Total capacity including the terminator
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Longest line the buffer can hold
    pub fn max_len(&self) -> usize {
        self.buf.len() - 1
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current line contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Current line contents with the trailing terminator
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }

    /// Insert (or overwrite) one byte at the cursor.
    ///
    /// Returns false when the line is full and the byte was dropped.
    pub fn insert(&mut self, byte: u8, mode: InsertMode, out: &mut dyn Transport) -> bool {
        let shifting = mode == InsertMode::Insert && self.cursor < self.len;
        let grows = mode == InsertMode::Insert || self.cursor == self.len;

        if grows && self.len >= self.max_len() {
            return false;
        }

        if shifting {
            self.buf.copy_within(self.cursor..self.len, self.cursor + 1);
        }
        self.buf[self.cursor] = byte;
        self.cursor += 1;
        if grows {
            self.len += 1;
        }
        self.buf[self.len] = 0;

        if shifting {
            out.emit_seq(Sequence::ClearToEol);
            out.emit(&self.buf[self.cursor - 1..self.len]);
            out.move_left(self.len - self.cursor);
        } else {
            out.emit_byte(byte);
        }
        true
    }

    /// Delete the byte left of the cursor
    pub fn backspace(&mut self, out: &mut dyn Transport) {
        if self.cursor == 0 {
            return;
        }

        out.emit_seq(Sequence::CursorLeft);
        out.emit_seq(Sequence::ClearToEol);

        self.buf.copy_within(self.cursor..self.len, self.cursor - 1);
        self.cursor -= 1;
        self.len -= 1;
        self.buf[self.len] = 0;

        self.redraw_suffix(out);
    }

    /// Delete the byte under the cursor
    pub fn cancel(&mut self, out: &mut dyn Transport) {
        if self.cursor >= self.len {
            return;
        }

        out.emit_seq(Sequence::ClearToEol);

        self.buf.copy_within(self.cursor + 1..self.len, self.cursor);
        self.len -= 1;
        self.buf[self.len] = 0;

        self.redraw_suffix(out);
    }

    pub fn move_home(&mut self, out: &mut dyn Transport) {
        out.move_left(self.cursor);
        self.cursor = 0;
    }

    pub fn move_end(&mut self, out: &mut dyn Transport) {
        out.move_right(self.len - self.cursor);
        self.cursor = self.len;
    }

    pub fn move_left(&mut self, out: &mut dyn Transport) {
        if self.cursor > 0 {
            self.cursor -= 1;
            out.emit_seq(Sequence::CursorLeft);
        }
    }

    pub fn move_right(&mut self, out: &mut dyn Transport) {
        if self.cursor < self.len {
            self.cursor += 1;
            out.emit_seq(Sequence::CursorRight);
        }
    }

    /// Erase the visible line and empty the buffer
    pub fn clear_line(&mut self, out: &mut dyn Transport) {
        out.move_left(self.cursor);
        out.emit_seq(Sequence::ClearToEol);
        self.reset();
    }

    /// Replace the line with `source` (history recall)
    ///
    /// `source` is truncated to [`max_len`](Self::max_len).
    pub fn set(&mut self, source: &[u8], out: &mut dyn Transport) {
        out.move_left(self.cursor);

        let len = source.len().min(self.max_len());
        self.buf[..len].copy_from_slice(&source[..len]);
        self.buf[len] = 0;
        self.cursor = len;
        self.len = len;

        out.emit_seq(Sequence::ClearToEol);
        out.emit(&self.buf[..len]);
    }

    /// Empty the buffer without touching the terminal
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.len = 0;
        self.buf[0] = 0;
    }

    /// Rewrite everything from the cursor to the end of line, then walk back
    fn redraw_suffix(&self, out: &mut dyn Transport) {
        out.emit(&self.buf[self.cursor..self.len]);
        out.move_left(self.len - self.cursor);
    }
}
