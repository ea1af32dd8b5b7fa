//! Array-backed binary min-heap.
//!
//! Kept free of scheduler types on purpose: the scheduler keys it by due
//! time, the demo tools key it by plain integers. The heap shape lives in
//! the array layout: children of slot `i` sit at `2i + 1` and `2i + 2`,
//! the parent of `i` at `(i - 1) / 2`.

use crate::errors::SchedError;

#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    items: Vec<T>,
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Ord> MinHeap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self { items: Vec::with_capacity(cap) }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read-only view of the backing array, root at index 0. Consumers that
    /// care about structure (the dot exporter) walk this by index arithmetic.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Append at the right-hand side of the bottom row, which keeps the
    /// tree shape, then sift the new item up as far as it should go.
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Remove and return the minimum. The last item moves to the root slot
    /// and sifts down toward the smaller child until order is restored.
    pub fn extract_min(&mut self) -> Result<T, SchedError> {
        if self.items.is_empty() {
            return Err(SchedError::HeapEmpty);
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let Some(min) = self.items.pop() else {
            return Err(SchedError::HeapEmpty);
        };
        self.sift_down(0);
        Ok(min)
    }

    /// Minimum without removal. Repeated calls return the same item.
    pub fn peek(&self) -> Result<&T, SchedError> {
        self.items.first().ok_or(SchedError::HeapEmpty)
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.items[idx] < self.items[parent] {
                self.items.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let mut smallest = if self.items[left] < self.items[idx] { left } else { idx };
            let right = left + 1;
            if right < len && self.items[right] < self.items[smallest] {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.items.swap(idx, smallest);
            idx = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn holds_invariant(items: &[i64]) -> bool {
        (1..items.len()).all(|i| items[(i - 1) / 2] <= items[i])
    }

    #[test]
    fn sorts_inserted_values() {
        let mut h = MinHeap::new();
        for v in [5i64, 3, 8, 1] {
            h.insert(v);
        }
        let mut out = Vec::new();
        while let Ok(v) = h.extract_min() {
            out.push(v);
        }
        assert_eq!(out, vec![1, 3, 5, 8]);
    }

    #[test]
    fn peek_is_idempotent() {
        let mut h = MinHeap::new();
        h.insert(7i64);
        h.insert(2);
        h.insert(9);
        assert_eq!(h.peek(), Ok(&2));
        assert_eq!(h.peek(), Ok(&2));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn empty_heap_is_an_error_not_a_panic() {
        let mut h: MinHeap<i64> = MinHeap::new();
        assert_eq!(h.peek(), Err(crate::errors::SchedError::HeapEmpty));
        assert_eq!(h.extract_min(), Err(crate::errors::SchedError::HeapEmpty));
    }

    #[test]
    fn duplicate_keys_all_come_back() {
        let mut h = MinHeap::new();
        for v in [4i64, 4, 4, 1, 1] {
            h.insert(v);
        }
        let mut out = Vec::new();
        while let Ok(v) = h.extract_min() {
            out.push(v);
        }
        assert_eq!(out, vec![1, 1, 4, 4, 4]);
    }

    proptest! {
        #[test]
        fn invariant_survives_mixed_ops(ops in prop::collection::vec((any::<bool>(), any::<i64>()), 0..200)) {
            let mut h = MinHeap::new();
            for (do_insert, v) in ops {
                if do_insert {
                    h.insert(v);
                } else {
                    let _ = h.extract_min();
                }
                prop_assert!(holds_invariant(h.as_slice()));
            }
        }

        #[test]
        fn extracts_in_nondecreasing_order(mut vals in prop::collection::vec(any::<i64>(), 1..100)) {
            let mut h = MinHeap::with_capacity(vals.len());
            for &v in &vals {
                h.insert(v);
            }
            let mut out = Vec::with_capacity(vals.len());
            while let Ok(v) = h.extract_min() {
                out.push(v);
            }
            vals.sort();
            prop_assert_eq!(out, vals);
        }
    }
}
