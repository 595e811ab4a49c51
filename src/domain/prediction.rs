// ============================================================
// Layer 3 — Prediction Domain Types
// ============================================================
// What the driver produces per example, plus the choice of
// which checkpoint to restore.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the predictions file.
///
/// Field order matters: serde writes struct fields in
/// declaration order, which is the order readers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub front_testid:   String,
    pub behind_testid:  String,
    /// Ground-truth class id
    pub labels:         usize,
    /// Predicted class id
    pub predict_labels: usize,
    /// Top-1 predicted score, rounded to 4 decimals
    pub predict_scores: f64,
}

/// Which saved checkpoint of a run to restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointChoice {
    /// The checkpoint with the best tracked validation metric
    Best,
    /// The most recently written checkpoint
    Latest,
}

impl fmt::Display for CheckpointChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointChoice::Best   => write!(f, "best"),
            CheckpointChoice::Latest => write!(f, "latest"),
        }
    }
}
