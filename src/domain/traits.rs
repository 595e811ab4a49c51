// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Two seams keep the evaluation loop independent of files
// and of Burn:
//
//   ExampleSource   — anything that yields labelled test pairs
//                     (JSON-lines file today)
//   BatchClassifier — anything that scores a batch of padded
//                     pairs (the restored SANN model, or a mock
//                     in tests)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::example::TestSet;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can load the labelled test set.
pub trait ExampleSource {
    /// Load every example, in source order.
    fn load_all(&self) -> Result<TestSet>;
}

// ─── PaddedPair ───────────────────────────────────────────────────────────────
/// A test example after padding: both sequences have the
/// same fixed length so a batch stacks into one tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedPair {
    pub front:    Vec<u32>,
    pub behind:   Vec<u32>,
    /// Ground-truth class id (argmax of the one-hot label)
    pub label_id: usize,
}

// ─── BatchPrediction ──────────────────────────────────────────────────────────
/// The outputs fetched for one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchPrediction {
    /// Predicted class id per example
    pub predicted_labels: Vec<usize>,
    /// Top-k scores per example, highest first
    pub top_k_scores:     Vec<Vec<f32>>,
    /// Mean loss over the batch
    pub loss:             f64,
}

// ─── BatchClassifier ──────────────────────────────────────────────────────────
/// Any component that can score a batch of padded pairs.
pub trait BatchClassifier {
    fn classify(&self, batch: &[PaddedPair]) -> Result<BatchPrediction>;
}
