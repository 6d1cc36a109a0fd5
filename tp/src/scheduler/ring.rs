//! Fixed-capacity ring buffer for terminal tasks

use std::collections::VecDeque;

/// Keeps the newest `capacity` items, evicting the oldest on overflow
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning whatever was evicted to make room
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    /// Newest matching item
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().rev().find(|item| pred(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut ring = RingBuffer::with_capacity(3);
        assert!(ring.push(1).is_none());
        assert!(ring.push(2).is_none());
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.capacity(), 3);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut ring = RingBuffer::with_capacity(2);
        ring.push("a");
        ring.push("b");
        assert_eq!(ring.push("c"), Some("a"));
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut ring = RingBuffer::with_capacity(0);
        assert_eq!(ring.push(7), Some(7));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_find_prefers_newest() {
        let mut ring = RingBuffer::with_capacity(4);
        ring.push((1, "old"));
        ring.push((1, "new"));
        ring.push((2, "other"));
        assert_eq!(ring.find(|(k, _)| *k == 1), Some(&(1, "new")));
        assert!(ring.find(|(k, _)| *k == 3).is_none());
    }
}
