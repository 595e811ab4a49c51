// ============================================================
// Layer 6 — Predictions File
// ============================================================
// Writes one JSON object per test example, in test-file order:
//
//   {"front_testid":"q1","behind_testid":"q2","labels":1,"predict_labels":1,"predict_scores":0.9731}
//
// predict_scores is the example's top-1 score rounded to four
// decimals. The output path must end in ".json"; parent
// directories are created as needed.

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::domain::example::TestSet;
use crate::domain::prediction::PredictionRecord;

/// Zip example ids with the flat prediction sequences.
pub fn build_records(
    test_set:     &TestSet,
    labels:       &[usize],
    predicted:    &[usize],
    top1_scores:  &[f32],
) -> Result<Vec<PredictionRecord>> {
    let n = test_set.len();
    if labels.len() != n || predicted.len() != n || top1_scores.len() != n {
        bail!(
            "Prediction count mismatch: {} examples, {} labels, {} predictions, {} scores",
            n,
            labels.len(),
            predicted.len(),
            top1_scores.len()
        );
    }

    Ok(test_set
        .examples
        .iter()
        .enumerate()
        .map(|(i, ex)| PredictionRecord {
            front_testid:   ex.front_id.clone(),
            behind_testid:  ex.behind_id.clone(),
            labels:         labels[i],
            predict_labels: predicted[i],
            predict_scores: round4(top1_scores[i] as f64),
        })
        .collect())
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Write records as JSON lines to `path`.
pub fn create_prediction_file(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        bail!("Prediction file '{}' must be a .json file", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    tracing::debug!("Wrote {} predictions to '{}'", records.len(), path.display());
    Ok(())
}
