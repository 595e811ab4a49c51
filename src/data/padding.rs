// ============================================================
// Layer 4 — Sequence Padding
// ============================================================
// Brings every token sequence to the same fixed length so a
// batch can be stacked into a single [batch, seq_len] tensor.
//
// Both padding and truncation happen at the FRONT:
//
//   len = 5, tokens = [7, 8, 9]          → [0, 0, 7, 8, 9]
//   len = 2, tokens = [7, 8, 9]          → [8, 9]
//
// This matches how the model was fed during training: the
// last tokens of a text sit right before the end of the
// sequence, which is where the recurrent state is read.
//
// Reference: Rust Book §8 (Vectors)

use crate::domain::example::TestSet;
use crate::domain::traits::PaddedPair;

/// Token id used to fill the padded positions
pub const PAD_ID: u32 = 0;

/// Pad or truncate one sequence to exactly `len` tokens.
pub fn pad_sequence(tokens: &[u32], len: usize) -> Vec<u32> {
    if tokens.len() >= len {
        // Keep the last `len` tokens
        return tokens[tokens.len() - len..].to_vec();
    }
    let mut padded = vec![PAD_ID; len - tokens.len()];
    padded.extend_from_slice(tokens);
    padded
}

/// Pad both sides of every example in the test set.
pub fn pad_data(test_set: &TestSet, len: usize) -> Vec<PaddedPair> {
    test_set
        .examples
        .iter()
        .map(|e| PaddedPair {
            front:    pad_sequence(&e.front_tokens, len),
            behind:   pad_sequence(&e.behind_tokens, len),
            label_id: e.label_id(),
        })
        .collect()
}
