// ============================================================
// Layer 5 — Evaluation Loop
// ============================================================
// One pass over the padded test set:
//
//   for each batch (in order, no shuffling):
//     1. score it with the classifier
//     2. append ground-truth ids, predicted ids, top-k scores
//     3. add the batch loss to the running total
//
//   mean loss = total loss / number of batches
//
// The flat sequences keep test-file order so they can be
// zipped with the example ids afterwards.
//
// Reference: Burn Book §5 (Inference)

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::data::batch_iter::BatchIter;
use crate::domain::traits::{BatchClassifier, PaddedPair};

/// Everything accumulated over the test set.
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    /// Ground-truth class ids
    pub labels:           Vec<usize>,
    /// Predicted class ids
    pub predicted_labels: Vec<usize>,
    /// Top-k scores per example
    pub top_k_scores:     Vec<Vec<f32>>,
    /// Mean of the per-batch losses
    pub loss:             f64,
    /// Number of batches scored
    pub batches:          usize,
}

impl EvaluationOutcome {
    /// The highest score of each example.
    pub fn top1_scores(&self) -> Vec<f32> {
        self.top_k_scores
            .iter()
            .map(|row| row.first().copied().unwrap_or(0.0))
            .collect()
    }
}

pub fn run_evaluation<C: BatchClassifier>(
    classifier: &C,
    items:      &[PaddedPair],
    batch_size: usize,
) -> Result<EvaluationOutcome> {
    if items.is_empty() {
        bail!("The test set is empty, nothing to evaluate");
    }
    if batch_size == 0 {
        bail!("Batch size must be at least 1");
    }

    let batches = BatchIter::new(items, batch_size, 1);

    let pb = ProgressBar::new(batches.batches_per_epoch() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({eta})")?
            .progress_chars("=> "),
    );

    let mut outcome  = EvaluationOutcome::default();
    let mut loss_sum = 0.0f64;

    for batch in batches {
        let pred = classifier.classify(&batch)?;
        if pred.predicted_labels.len() != batch.len() || pred.top_k_scores.len() != batch.len() {
            bail!(
                "Classifier returned {} predictions for a batch of {}",
                pred.predicted_labels.len(),
                batch.len()
            );
        }

        outcome.labels.extend(batch.iter().map(|p| p.label_id));
        outcome.predicted_labels.extend(pred.predicted_labels);
        outcome.top_k_scores.extend(pred.top_k_scores);

        loss_sum        += pred.loss;
        outcome.batches += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    outcome.loss = loss_sum / outcome.batches as f64;
    tracing::debug!(
        "Scored {} examples in {} batches",
        outcome.labels.len(),
        outcome.batches
    );
    Ok(outcome)
}
