//! Key mapping for terminal input
//!
//! Converts host key events to the bytes a VT220 serial terminal sends, so
//! the console sees the same stream it would see on the wire. Keys the
//! console has no meaning for (function keys, modified cursor keys) map to
//! nothing rather than to sequences it would half-parse.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Key mapper for converting key events to bytes
pub struct KeyMapper;

impl KeyMapper {
    /// Map a crossterm KeyEvent to bytes, empty when the key sends nothing
    pub fn map_key(event: &KeyEvent) -> Vec<u8> {
        if event.kind == KeyEventKind::Release {
            return Vec::new();
        }
        Self::map(event).unwrap_or_default()
    }

    /// Map a crossterm KeyEvent to bytes
    pub fn map(event: &KeyEvent) -> Option<Vec<u8>> {
        let mods = Modifiers::from(event.modifiers);

        match event.code {
            KeyCode::Char(ch) => Self::map_char(ch, mods),

            KeyCode::Enter => Some(vec![0x0D]),
            KeyCode::Backspace => Some(vec![0x7F]),
            KeyCode::Tab => Some(vec![0x09]),
            KeyCode::Esc => Some(vec![0x1B]),

            // Cursor keys; modified forms (ESC [ 1 ; m X) are not understood
            KeyCode::Up => Self::plain(mods, b"\x1b[A"),
            KeyCode::Down => Self::plain(mods, b"\x1b[B"),
            KeyCode::Right => Self::plain(mods, b"\x1b[C"),
            KeyCode::Left => Self::plain(mods, b"\x1b[D"),

            // Editing keypad, VT220 style
            KeyCode::Home => Self::plain(mods, &Self::tilde_key(1)),
            KeyCode::Insert => Self::plain(mods, &Self::tilde_key(2)),
            KeyCode::Delete => Self::plain(mods, &Self::tilde_key(3)),
            KeyCode::End => Self::plain(mods, &Self::tilde_key(4)),
            KeyCode::PageUp => Self::plain(mods, &Self::tilde_key(5)),
            KeyCode::PageDown => Self::plain(mods, &Self::tilde_key(6)),

            _ => None,
        }
    }

    /// Map a character with modifiers
    fn map_char(ch: char, mods: Modifiers) -> Option<Vec<u8>> {
        if !ch.is_ascii() {
            return None;
        }

        // Ctrl + letter = control character
        if mods.contains(Modifiers::CTRL) {
            if ch.is_ascii_alphabetic() {
                let ctrl_code = (ch.to_ascii_lowercase() as u8) - b'a' + 1;
                return Some(vec![ctrl_code]);
            }
            return match ch {
                '@' | ' ' => Some(vec![0x00]),
                '[' => Some(vec![0x1B]),
                '\\' => Some(vec![0x1C]),
                ']' => Some(vec![0x1D]),
                '^' => Some(vec![0x1E]),
                '_' => Some(vec![0x1F]),
                _ => None,
            };
        }

        // Alt + key = ESC + key
        if mods.contains(Modifiers::ALT) {
            return Some(vec![0x1B, ch as u8]);
        }

        Some(vec![ch as u8])
    }

    /// Sequence for an unmodified key only
    fn plain(mods: Modifiers, seq: &[u8]) -> Option<Vec<u8>> {
        let mods = mods - Modifiers::SHIFT;
        if mods.is_empty() {
            Some(seq.to_vec())
        } else {
            None
        }
    }

    /// Tilde key sequence (ESC [ n ~)
    fn tilde_key(code: u8) -> Vec<u8> {
        format!("\x1b[{}~", code).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::escape::{Classifier, Control, Input};

    fn key_event(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    fn classify(bytes: &[u8]) -> Vec<Input> {
        let mut classifier = Classifier::new();
        bytes.iter().filter_map(|&b| classifier.feed(b)).collect()
    }

    #[test]
    fn test_char_keys() {
        let event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(b"a".to_vec()));

        let event = key_event(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(KeyMapper::map(&event), Some(b"A".to_vec()));

        // Ctrl+C
        let event = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(KeyMapper::map(&event), Some(vec![0x03]));

        // Ctrl+X
        let event = key_event(KeyCode::Char('X'), KeyModifiers::CONTROL);
        assert_eq!(KeyMapper::map(&event), Some(vec![0x18]));

        // Alt+x
        let event = key_event(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(KeyMapper::map(&event), Some(vec![0x1B, b'x']));
    }

    #[test]
    fn test_non_ascii_ignored() {
        let event = key_event(KeyCode::Char('é'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), None);
    }

    #[test]
    fn test_arrow_keys() {
        let event = key_event(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(b"\x1b[A".to_vec()));

        // Modified arrows send nothing
        let event = key_event(KeyCode::Up, KeyModifiers::CONTROL);
        assert_eq!(KeyMapper::map(&event), None);
    }

    #[test]
    fn test_editing_keys() {
        let event = key_event(KeyCode::Home, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(b"\x1b[1~".to_vec()));

        let event = key_event(KeyCode::End, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(b"\x1b[4~".to_vec()));

        let event = key_event(KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(b"\x1b[3~".to_vec()));

        let event = key_event(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), None);
    }

    #[test]
    fn test_release_sends_nothing() {
        let mut event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert!(KeyMapper::map_key(&event).is_empty());
    }

    #[test]
    fn test_mapped_keys_classify() {
        let cases = [
            (KeyCode::Enter, Control::Enter),
            (KeyCode::Backspace, Control::Backspace),
            (KeyCode::Delete, Control::Cancel),
            (KeyCode::Home, Control::Home),
            (KeyCode::End, Control::End),
            (KeyCode::Insert, Control::InsertToggle),
            (KeyCode::PageUp, Control::PageUp),
            (KeyCode::PageDown, Control::PageDown),
            (KeyCode::Up, Control::ArrowUp),
            (KeyCode::Down, Control::ArrowDown),
            (KeyCode::Right, Control::ArrowRight),
            (KeyCode::Left, Control::ArrowLeft),
        ];
        for (code, control) in cases {
            let bytes = KeyMapper::map_key(&key_event(code, KeyModifiers::NONE));
            assert_eq!(classify(&bytes), vec![Input::Control(control)], "{:?}", code);
        }
    }
}
