// ============================================================
// Layer 3 — Test Example Domain Types
// ============================================================
// A test example is a pair of texts ("front" and "behind")
// already converted to token ids, plus a one-hot label saying
// which class the pair belongs to.
//
// Example (two classes, "similar" = 1):
//   front:  [12, 7, 330]     ← ids of "how to cook rice"
//   behind: [12, 7, 88, 330] ← ids of "how to boil rice"
//   label:  [0.0, 1.0]
//
// Examples are immutable once loaded. The ids are carried so
// predictions can be traced back to the original records.

use serde::{Deserialize, Serialize};

/// One labelled text pair, tokenised but not yet padded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExample {
    /// Identifier of the front text
    pub front_id: String,

    /// Identifier of the behind text
    pub behind_id: String,

    /// Token ids of the front text (vocabulary order)
    pub front_tokens: Vec<u32>,

    /// Token ids of the behind text
    pub behind_tokens: Vec<u32>,

    /// One-hot label vector, one entry per class
    pub label: Vec<f32>,
}

impl TestExample {
    /// Index of the hot entry in the label vector.
    /// Ties resolve to the first maximum, like numpy's argmax.
    pub fn label_id(&self) -> usize {
        let mut best = 0;
        for (i, v) in self.label.iter().enumerate() {
            if *v > self.label[best] {
                best = i;
            }
        }
        best
    }
}

/// Build a one-hot vector with `num_classes` entries.
/// Returns None when `label` is not a valid class index.
pub fn one_hot(label: usize, num_classes: usize) -> Option<Vec<f32>> {
    if label >= num_classes {
        return None;
    }
    let mut v = vec![0.0; num_classes];
    v[label] = 1.0;
    Some(v)
}

/// The whole held-out test set, in file order.
#[derive(Debug, Clone, Default)]
pub struct TestSet {
    pub examples: Vec<TestExample>,
}

impl TestSet {
    pub fn new(examples: Vec<TestExample>) -> Self {
        Self { examples }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
