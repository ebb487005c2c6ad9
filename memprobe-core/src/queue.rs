//! Fixed-capacity byte queue
//!
//! Circular buffer used in both transport directions (host → device and
//! device → host). Capacity is a power of two so cursor wraparound is a mask.
//!
//! Each instance has exactly one producer and one consumer. In the firmware
//! both run in the same foreground task, so no synchronization is needed.

use core::fmt;

/// Insertion was rejected because the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

/// Bounded FIFO of bytes with capacity `N`
#[derive(Debug, Clone)]
pub struct ByteQueue<const N: usize> {
    buffer: [u8; N],
    read: usize,
    write: usize,
    count: usize,
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteQueue<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "ByteQueue capacity must be a power of two");
        N - 1
    };

    /// Create an empty queue
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            buffer: [0; N],
            read: 0,
            write: 0,
            count: 0,
        }
    }

    /// Append a byte
    ///
    /// A full queue is left untouched and `QueueFull` is returned.
    pub fn insert(&mut self, byte: u8) -> Result<(), QueueFull> {
        if self.is_full() {
            return Err(QueueFull);
        }
        self.buffer[self.write] = byte;
        self.write = (self.write + 1) & Self::MASK;
        self.count += 1;
        Ok(())
    }

    /// Remove and return the oldest byte, `None` when empty
    pub fn remove(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buffer[self.read];
        self.read = (self.read + 1) & Self::MASK;
        self.count -= 1;
        Some(byte)
    }

    /// Oldest byte without removing it
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.buffer[self.read])
        }
    }

    /// Number of bytes currently queued
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of bytes that can still be inserted
    pub fn free(&self) -> usize {
        N - self.count
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Drop all queued bytes
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
        self.count = 0;
    }
}

/// Formatted responses are written straight into the queue.
///
/// When the queue fills up the rest of the text is dropped and
/// `fmt::Error` is returned.
impl<const N: usize> fmt::Write for ByteQueue<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &byte in s.as_bytes() {
            self.insert(byte).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use proptest::prelude::*;
    use std::vec::Vec;

    #[test]
    fn test_new_queue_is_empty() {
        let queue = ByteQueue::<8>::new();
        assert!(queue.is_empty());
        assert!(!queue.is_full());
        assert_eq!(queue.count(), 0);
        assert_eq!(queue.capacity(), 8);
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn test_insert_into_full_queue_is_rejected() {
        let mut queue = ByteQueue::<4>::new();
        for byte in 1..=4 {
            queue.insert(byte).unwrap();
        }
        assert!(queue.is_full());

        let before = queue.clone();
        assert_eq!(queue.insert(99), Err(QueueFull));
        assert_eq!(queue.count(), before.count());
        assert_eq!(queue.read, before.read);
        assert_eq!(queue.write, before.write);
        assert_eq!(queue.buffer, before.buffer);

        for byte in 1..=4 {
            assert_eq!(queue.remove(), Some(byte));
        }
        assert_eq!(queue.remove(), None);
    }

    #[test]
    fn test_cursors_wrap_around() {
        let mut queue = ByteQueue::<4>::new();
        for round in 0u8..10 {
            queue.insert(round).unwrap();
            queue.insert(round.wrapping_add(100)).unwrap();
            assert_eq!(queue.remove(), Some(round));
            assert_eq!(queue.peek(), Some(round.wrapping_add(100)));
            assert_eq!(queue.remove(), Some(round.wrapping_add(100)));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_resets_bookkeeping() {
        let mut queue = ByteQueue::<8>::new();
        queue.insert(1).unwrap();
        queue.insert(2).unwrap();
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.free(), 8);
        assert_eq!(queue.remove(), None);
    }

    #[test]
    fn test_fmt_write_truncates_when_full() {
        let mut queue = ByteQueue::<4>::new();
        assert!(write!(queue, "{}", 12).is_ok());
        assert!(write!(queue, "abc").is_err());
        assert!(queue.is_full());

        let drained: Vec<u8> = core::iter::from_fn(|| queue.remove()).collect();
        assert_eq!(drained, b"12ab");
    }

    proptest! {
        #[test]
        fn prop_fifo_order(bytes in proptest::collection::vec(any::<u8>(), 0..=64)) {
            let mut queue = ByteQueue::<64>::new();
            for &byte in &bytes {
                prop_assert_eq!(queue.insert(byte), Ok(()));
            }
            prop_assert_eq!(queue.count(), bytes.len());

            let drained: Vec<u8> = core::iter::from_fn(|| queue.remove()).collect();
            prop_assert_eq!(drained, bytes);
            prop_assert!(queue.is_empty());
        }

        #[test]
        fn prop_fifo_order_after_offset(skip in 0usize..16, bytes in proptest::collection::vec(any::<u8>(), 0..=16)) {
            let mut queue = ByteQueue::<16>::new();
            for _ in 0..skip {
                queue.insert(0).unwrap();
                queue.remove().unwrap();
            }
            for &byte in &bytes {
                queue.insert(byte).unwrap();
            }
            let drained: Vec<u8> = core::iter::from_fn(|| queue.remove()).collect();
            prop_assert_eq!(drained, bytes);
        }
    }
}
