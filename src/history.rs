//! Command history for vtconsole
//!
//! Fixed-capacity ring of previously executed lines. Slots are allocated
//! once when the ring is created and never grow. A capacity of 0 turns the
//! history off; a capacity of 1 keeps only the last line.

/// Recall direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Older entry (arrow up)
    Previous,
    /// Newer entry (arrow down)
    Next,
}

/// Command history ring
pub struct History {
    /// `capacity * width` bytes, one slot per entry
    slots: Box<[u8]>,
    /// Length of each entry
    lengths: Box<[usize]>,
    /// Bytes per slot
    width: usize,
    /// Next slot to write
    write_pos: usize,
    /// Slot returned by the next recall
    read_pos: usize,
    /// Number of valid entries
    count: usize,
    /// The line buffer currently mirrors a recalled entry
    recall_active: bool,
}

impl History {
    /// Create an empty ring of `capacity` entries, each up to `width` bytes
    ///
    /// A size whose slot storage would overflow `usize` yields a disabled
    /// (zero capacity) ring.
    pub fn new(capacity: usize, width: usize) -> Self {
        let (capacity, width) = match capacity.checked_mul(width) {
            Some(_) => (capacity, width),
            None => (0, 0),
        };
        Self {
            slots: vec![0u8; capacity * width].into_boxed_slice(),
            lengths: vec![0usize; capacity].into_boxed_slice(),
            width,
            write_pos: 0,
            read_pos: 0,
            count: 0,
            recall_active: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.lengths.len()
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn recall_active(&self) -> bool {
        self.recall_active
    }

    /// Forget that the line buffer holds a recalled entry (the user edited it)
    pub fn clear_recall(&mut self) {
        self.recall_active = false;
    }

    /// Store a line in the next slot, overwriting the oldest once full
    pub fn write(&mut self, line: &[u8]) {
        if self.capacity() == 0 {
            return;
        }

        let len = line.len().min(self.width);
        let start = self.write_pos * self.width;
        self.slots[start..start + len].copy_from_slice(&line[..len]);
        self.lengths[self.write_pos] = len;

        self.read_pos = self.write_pos;
        self.write_pos = (self.write_pos + 1) % self.capacity();
        if self.count < self.capacity() {
            self.count += 1;
        }
    }

    /// Recall an entry.
    ///
    /// The first recall after an edit returns the latest entry without
    /// moving; later recalls step through the ring in `direction`,
    /// wrapping at both ends.
    pub fn recall(&mut self, direction: Direction) -> Option<&[u8]> {
        if self.count == 0 {
            return None;
        }

        if self.recall_active {
            self.read_pos = match direction {
                Direction::Next => (self.read_pos + 1) % self.count,
                Direction::Previous => {
                    if self.read_pos == 0 {
                        self.count - 1
                    } else {
                        self.read_pos - 1
                    }
                }
            };
        }

        self.recall_active = true;
        Some(self.slot(self.read_pos))
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        // Oldest entry sits at write_pos once the ring has wrapped
        let first = if self.count == self.capacity() { self.write_pos } else { 0 };
        (0..self.count).map(move |i| self.slot((first + i) % self.capacity()))
    }

    fn slot(&self, index: usize) -> &[u8] {
        let start = index * self.width;
        &self.slots[start..start + self.lengths[index]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(capacity: usize, lines: &[&[u8]]) -> History {
        let mut history = History::new(capacity, 32);
        for line in lines {
            history.write(line);
        }
        history
    }

    #[test]
    fn test_empty_recall() {
        let mut history = History::new(4, 32);
        assert_eq!(history.recall(Direction::Previous), None);
        assert!(!history.recall_active());
    }

    #[test]
    fn test_recall_newest_first() {
        let mut history = history_with(4, &[b"one", b"two", b"three"]);
        assert_eq!(history.recall(Direction::Previous), Some(&b"three"[..]));
        assert_eq!(history.recall(Direction::Previous), Some(&b"two"[..]));
        assert_eq!(history.recall(Direction::Previous), Some(&b"one"[..]));
        // Wraps back around to the newest
        assert_eq!(history.recall(Direction::Previous), Some(&b"three"[..]));
    }

    #[test]
    fn test_recall_next_wraps() {
        let mut history = history_with(4, &[b"one", b"two", b"three"]);
        assert_eq!(history.recall(Direction::Next), Some(&b"three"[..]));
        assert_eq!(history.recall(Direction::Next), Some(&b"one"[..]));
        assert_eq!(history.recall(Direction::Next), Some(&b"two"[..]));
    }

    #[test]
    fn test_first_recall_after_edit_stays() {
        let mut history = history_with(4, &[b"one", b"two"]);
        assert_eq!(history.read_pos(), 1);
        history.recall(Direction::Previous);
        history.recall(Direction::Previous);
        assert_eq!(history.read_pos(), 0);
        history.clear_recall();
        // read_pos stays where the last recall left it
        assert_eq!(history.recall(Direction::Previous), Some(&b"one"[..]));
    }

    #[test]
    fn test_write_overwrites_oldest() {
        let mut history = history_with(3, &[b"a", b"b", b"c", b"d"]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.write_pos(), 1);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![&b"b"[..], &b"c"[..], &b"d"[..]]);

        assert_eq!(history.recall(Direction::Previous), Some(&b"d"[..]));
        assert_eq!(history.recall(Direction::Previous), Some(&b"c"[..]));
        assert_eq!(history.recall(Direction::Previous), Some(&b"b"[..]));
        assert_eq!(history.recall(Direction::Previous), Some(&b"d"[..]));
    }

    #[test]
    fn test_single_slot() {
        let mut history = history_with(1, &[b"first", b"second"]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.recall(Direction::Previous), Some(&b"second"[..]));
        assert_eq!(history.recall(Direction::Next), Some(&b"second"[..]));
        assert_eq!(history.recall(Direction::Previous), Some(&b"second"[..]));
    }

    #[test]
    fn test_zero_capacity_discards() {
        let mut history = history_with(0, &[b"gone"]);
        assert!(history.is_empty());
        assert_eq!(history.recall(Direction::Previous), None);
        assert_eq!(history.iter().count(), 0);
    }

    #[test]
    fn test_overflowing_size_disables() {
        let mut history = History::new(usize::MAX / 16, 32);
        assert_eq!(history.capacity(), 0);
        history.write(b"gone");
        assert_eq!(history.recall(Direction::Previous), None);
    }

    #[test]
    fn test_iter_before_wrap() {
        let history = history_with(4, &[b"x", b"y"]);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![&b"x"[..], &b"y"[..]]);
    }
}
