// ============================================================
// Layer 4 — Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<PaddedPair>
// into tensors the SANN model can consume.
//
// How batching works here:
//   Input:  N PaddedPairs, each side padded to length S
//   Output: PairBatch with
//             front  [N, S]  Int
//             behind [N, S]  Int
//             labels [N]     Int   (class ids)
//
//   Each side is flattened row by row then reshaped:
//   [p1_t1, ..., p1_tS, p2_t1, ..., pN_tS] → [N, S]
//
// All sequences are pre-padded, so no dynamic padding or
// masks are needed here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::traits::PaddedPair;

// ─── PairBatch ────────────────────────────────────────────────────────────────
/// A batch of text pairs ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct PairBatch<B: Backend> {
    /// Front token ids — shape: [batch_size, seq_len]
    pub front: Tensor<B, 2, Int>,

    /// Behind token ids — shape: [batch_size, seq_len]
    pub behind: Tensor<B, 2, Int>,

    /// Ground-truth class ids — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── PairBatcher ──────────────────────────────────────────────────────────────
/// Stateless: the target device is supplied per call.
#[derive(Clone, Debug, Default)]
pub struct PairBatcher;

impl PairBatcher {
    pub fn new() -> Self {
        Self
    }
}

/// Flatten one side of every pair into a [N, S] tensor.
fn stack_side<B: Backend>(rows: Vec<&[u32]>, device: &B::Device) -> Tensor<B, 2, Int> {
    let batch_size = rows.len();
    let seq_len    = rows.first().map(|r| r.len()).unwrap_or(0);
    let flat: Vec<i64> = rows
        .into_iter()
        .flat_map(|r| r.iter().map(|&t| t as i64))
        .collect();

    Tensor::<B, 2, Int>::from_data(TensorData::new(flat, [batch_size, seq_len]), device)
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<B, PaddedPair, PairBatch<B>> for PairBatcher {
    fn batch(&self, items: Vec<PaddedPair>, device: &B::Device) -> PairBatch<B> {
        let front  = stack_side::<B>(items.iter().map(|p| p.front.as_slice()).collect(), device);
        let behind = stack_side::<B>(items.iter().map(|p| p.behind.as_slice()).collect(), device);

        let labels: Vec<i64> = items.iter().map(|p| p.label_id as i64).collect();
        let n = labels.len();
        let labels = Tensor::<B, 1, Int>::from_data(TensorData::new(labels, [n]), device);

        PairBatch { front, behind, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_batch_shapes_and_values() {
        let device = Default::default();
        let items = vec![
            PaddedPair { front: vec![0, 1, 2], behind: vec![3, 4, 5], label_id: 1 },
            PaddedPair { front: vec![6, 7, 8], behind: vec![0, 0, 9], label_id: 0 },
        ];

        let batch: PairBatch<TestBackend> = PairBatcher::new().batch(items, &device);

        assert_eq!(batch.front.dims(), [2, 3]);
        assert_eq!(batch.behind.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);

        let behind: Vec<i64> = batch.behind.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(behind, vec![3, 4, 5, 0, 0, 9]);
        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![1, 0]);
    }
}
