// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{anyhow, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::batcher::{PairBatch, PairBatcher};
use crate::domain::traits::{BatchClassifier, BatchPrediction, PaddedPair};
use crate::ml::model::SannModel;

/// A restored SANN model bound to a device.
///
/// The backend is never an autodiff backend here, so dropout
/// is the identity and no gradients are tracked.
pub struct Inferencer<B: Backend> {
    model:   SannModel<B>,
    batcher: PairBatcher,
    device:  B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: SannModel<B>, device: B::Device) -> Self {
        Self { model, batcher: PairBatcher::new(), device }
    }
}

impl<B: Backend> BatchClassifier for Inferencer<B> {
    fn classify(&self, items: &[PaddedPair]) -> Result<BatchPrediction> {
        let batch: PairBatch<B> = self.batcher.batch(items.to_vec(), &self.device);

        let output = self.model.forward(batch.front, batch.behind);
        let loss   = self.model.loss(output.logits.clone(), batch.labels);
        let loss: f64 = loss.into_scalar().elem::<f64>();

        let predicted: Vec<i64> = output
            .predictions
            .into_data()
            .convert::<i64>()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read predictions: {e:?}"))?;

        let k = output.top_k_scores.dims()[1];
        let flat: Vec<f32> = output
            .top_k_scores
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read top-k scores: {e:?}"))?;

        Ok(BatchPrediction {
            predicted_labels: predicted.into_iter().map(|p| p as usize).collect(),
            top_k_scores:     flat.chunks(k.max(1)).map(|row| row.to_vec()).collect(),
            loss,
        })
    }
}
