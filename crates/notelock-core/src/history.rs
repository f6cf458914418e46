//! Bounded undo history.
//!
//! Snapshots are owned values: pushing clones the caller's state, so later
//! mutation of the live state cannot reach back into the buffer. Push only
//! before structural mutations (create, delete, reorder, a finalized field
//! edit), never per keystroke.

use std::collections::VecDeque;

/// Snapshots kept before the oldest is evicted.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Most-recent-first stack of state snapshots.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> HistoryBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a copy of `snapshot` as the most recent entry.
    pub fn push(&mut self, snapshot: &T) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(snapshot.clone());
        self.entries.truncate(self.capacity);
    }

    /// Remove and return the most recent snapshot.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshots from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T: Clone> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_returns_most_recent_first() {
        let mut history = HistoryBuffer::new();
        history.push(&1);
        history.push(&2);
        history.push(&3);

        assert_eq!(history.pop(), Some(3));
        assert_eq!(history.pop(), Some(2));
        assert_eq!(history.pop(), Some(1));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_sixty_pushes_keep_fifty_most_recent() {
        let mut history = HistoryBuffer::new();
        for i in 0..60 {
            history.push(&i);
        }

        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        let kept: Vec<i32> = history.iter().copied().collect();
        let expected: Vec<i32> = (10..60).rev().collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_snapshot_is_not_aliased_to_live_state() {
        let mut live = vec!["a".to_string()];
        let mut history = HistoryBuffer::new();
        history.push(&live);

        live.push("b".to_string());
        live[0].push('!');

        assert_eq!(history.pop(), Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = HistoryBuffer::with_capacity(0);
        history.push(&"x");
        assert!(history.is_empty());
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_clear_and_peek() {
        let mut history = HistoryBuffer::with_capacity(3);
        history.push(&'a');
        history.push(&'b');
        assert_eq!(history.peek(), Some(&'b'));
        history.clear();
        assert!(history.is_empty());
    }
}
