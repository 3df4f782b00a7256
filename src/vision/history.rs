use std::collections::VecDeque;

/// Fixed-capacity FIFO window: pushing at capacity evicts the oldest entry.
///
/// Every history buffer in the pipeline (grayscale frames, frame
/// differences, candidate layers, projected ball path) is one of these.
/// Components that need dummy seed entries push them explicitly in their
/// constructors.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    /// Create an empty window holding at most `capacity` elements.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sliding window capacity must be non-zero");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an element, evicting the oldest one when full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
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

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Element at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Oldest element.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Newest element.
    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity() {
        let mut w = SlidingWindow::new(3);
        w.push(1);
        w.push(2);
        assert_eq!(w.len(), 2);
        assert!(!w.is_full());
        assert_eq!(w.front(), Some(&1));
        assert_eq!(w.back(), Some(&2));
    }

    #[test]
    fn test_eviction_order() {
        let mut w = SlidingWindow::new(3);
        for i in 1..=5 {
            w.push(i);
        }
        assert!(w.is_full());
        assert_eq!(w.len(), 3);
        let items: Vec<_> = w.iter().copied().collect();
        assert_eq!(items, vec![3, 4, 5]);
    }

    #[test]
    fn test_get_indexing() {
        let mut w = SlidingWindow::new(2);
        w.push("a");
        w.push("b");
        w.push("c");
        assert_eq!(w.get(0), Some(&"b"));
        assert_eq!(w.get(1), Some(&"c"));
        assert_eq!(w.get(2), None);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = SlidingWindow::<i32>::new(0);
    }
}
