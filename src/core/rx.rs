//! Receive queue
//!
//! Single-producer, single-consumer byte ring standing in for a UART receive
//! interrupt and its available-byte counter.
//!
//! ```text
//! RxProducer ──push──▶ [ slots | available ] ──pop──▶ RxConsumer ──▶ Console
//! (interrupt / reader thread)                          (main loop)
//! ```
//!
//! The producer stores the byte and then increments `available`; the
//! consumer reads one byte and then decrements `available`, exactly once per
//! byte. Both sides only touch atomics, so no locking is needed. Producer and
//! consumer handles are not `Clone`, which keeps each side single.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Anything the console can pull received bytes from
pub trait ByteSource {
    /// Next byte in arrival order, or None when nothing is pending
    fn next_byte(&mut self) -> Option<u8>;
}

/// Bytes already in memory (scripts, tests)
impl ByteSource for std::collections::VecDeque<u8> {
    fn next_byte(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

/// Reading from a slice consumes it from the front
impl ByteSource for &[u8] {
    fn next_byte(&mut self) -> Option<u8> {
        let (&first, rest) = self.split_first()?;
        *self = rest;
        Some(first)
    }
}

struct Shared {
    slots: Box<[AtomicU8]>,
    /// Bytes pushed but not yet popped
    available: AtomicUsize,
    /// Bytes dropped because the ring was full
    overruns: AtomicUsize,
}

/// Create a queue holding up to `capacity` bytes
pub fn rx_queue(capacity: usize) -> (RxProducer, RxConsumer) {
    let shared = Arc::new(Shared {
        slots: (0..capacity.max(1)).map(|_| AtomicU8::new(0)).collect(),
        available: AtomicUsize::new(0),
        overruns: AtomicUsize::new(0),
    });
    (
        RxProducer { shared: shared.clone(), head: 0 },
        RxConsumer { shared, tail: 0 },
    )
}

/// Receiving side of the wire
pub struct RxProducer {
    shared: Arc<Shared>,
    head: usize,
}

impl RxProducer {
    /// Queue one received byte.
    ///
    /// Returns false (and counts an overrun) when the ring is full.
    pub fn push(&mut self, byte: u8) -> bool {
        let capacity = self.shared.slots.len();
        if self.shared.available.load(Ordering::Acquire) >= capacity {
            self.shared.overruns.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.shared.slots[self.head].store(byte, Ordering::Relaxed);
        self.head = (self.head + 1) % capacity;
        self.shared.available.fetch_add(1, Ordering::Release);
        true
    }

    /// Queue several bytes, returning how many fit
    pub fn push_all(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().take_while(|&&b| self.push(b)).count()
    }

    pub fn overruns(&self) -> usize {
        self.shared.overruns.load(Ordering::Relaxed)
    }
}

/// Console side of the wire
pub struct RxConsumer {
    shared: Arc<Shared>,
    tail: usize,
}

impl RxConsumer {
    /// Bytes waiting to be consumed
    pub fn available(&self) -> usize {
        self.shared.available.load(Ordering::Acquire)
    }

    /// Take the oldest pending byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.shared.available.load(Ordering::Acquire) == 0 {
            return None;
        }

        let byte = self.shared.slots[self.tail].load(Ordering::Relaxed);
        self.tail = (self.tail + 1) % self.shared.slots.len();
        self.shared.available.fetch_sub(1, Ordering::Release);
        Some(byte)
    }

    pub fn overruns(&self) -> usize {
        self.shared.overruns.load(Ordering::Relaxed)
    }

    /// Whether the producer side has been dropped
    pub fn is_disconnected(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

impl ByteSource for RxConsumer {
    fn next_byte(&mut self) -> Option<u8> {
        self.pop()
    }
}
