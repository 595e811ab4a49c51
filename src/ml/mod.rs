// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific model code lives here.
//
//   model.rs      — SANN architecture, rebuilt from its saved
//                   config so checkpoint weights can be loaded
//                   into it. Embedding → BiLSTM → structured
//                   self-attention per side → FC → softmax.
//
//   inferencer.rs — A restored model bound to a device; turns
//                   a batch of padded pairs into predictions,
//                   top-k scores and a loss value
//
//   evaluator.rs  — The single-epoch loop over the test set
//
//   metrics.rs    — Accuracy, precision, recall, F1, ROC AUC
//
// Reference: Burn Book §3 (Building Blocks)
//            Lin et al. (2017) A Structured Self-attentive
//            Sentence Embedding

/// SANN model architecture
pub mod model;

/// Restored model that scores batches
pub mod inferencer;

/// Single pass over the test set
pub mod evaluator;

/// Classification metrics
pub mod metrics;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ml::model::SannConfig;

    pub(crate) type TestBackend = burn::backend::NdArray<f32>;

    /// A model small enough to build in milliseconds:
    /// vocab 20, embedding 4, sequences of 6, 2 classes.
    pub(crate) fn tiny_config() -> SannConfig {
        SannConfig::new(20, 4, 6, 2)
            .with_lstm_hidden_size(3)
            .with_attention_unit_size(5)
            .with_attention_hops_size(2)
            .with_fc_hidden_size(8)
    }
}
