// ============================================================
// Layer 4 — Batch Iterator
// ============================================================
// Groups padded examples into fixed-size batches, lazily, one
// batch per `next()` call.
//
//   10 examples, batch_size 4 → [0..4] [4..8] [8..10]
//
// The last batch of an epoch may be short; nothing is dropped.
// Examples are always visited in file order, so the n-th
// prediction lines up with the n-th example.
//
// Reference: Rust Book §13 (Iterators)

/// Lazy batch iterator over a slice of items.
pub struct BatchIter<'a, T> {
    data:       &'a [T],
    batch_size: usize,
    num_epochs: usize,
    epoch:      usize,
    batch_num:  usize,
}

impl<'a, T: Clone> BatchIter<'a, T> {
    /// Iterate `num_epochs` times over `data` in order.
    pub fn new(data: &'a [T], batch_size: usize, num_epochs: usize) -> Self {
        Self {
            data,
            // Callers reject 0; clamp so the batch count stays defined
            batch_size: batch_size.max(1),
            num_epochs,
            epoch:      0,
            batch_num:  0,
        }
    }

    /// Batches produced per epoch: ceil(len / batch_size).
    pub fn batches_per_epoch(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            (self.data.len() - 1) / self.batch_size + 1
        }
    }
}

impl<T: Clone> Iterator for BatchIter<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.batch_num >= self.batches_per_epoch() {
            self.epoch    += 1;
            self.batch_num = 0;
        }
        if self.epoch >= self.num_epochs || self.data.is_empty() {
            return None;
        }

        let start = self.batch_num * self.batch_size;
        let end   = (start + self.batch_size).min(self.data.len());
        self.batch_num += 1;

        Some(self.data[start..end].to_vec())
    }
}
