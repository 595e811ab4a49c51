// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between files on disk and tensor batches:
//
//   word2vec file ──► Word2VecVocab   (word → token id)
//                          │
//   test file ─────► JsonLinesLoader  (pairs + one-hot labels)
//                          │
//                          ▼
//                     pad_data        (fixed length, pre-padding)
//                          │
//                          ▼
//                     BatchIter       (one lazy pass, in order)
//                          │
//                          ▼
//                     PairBatcher     (Vec<PaddedPair> → tensors)
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads word2vec text files into a vocabulary
pub mod embedding;

/// Loads the JSON-lines test set
pub mod loader;

/// Pads and truncates token sequences
pub mod padding;

/// Lazy fixed-size batch iteration
pub mod batch_iter;

/// Implements Burn's Batcher trait for text pairs
pub mod batcher;
