// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs   — run directory layout, best/latest
//                     checkpoint selection, restoring weights
//   frozen_graph.rs — inference-only export of a restored model
//   predictions.rs  — per-example predictions as JSON lines
//   metrics.rs      — CSV history of test-run metrics
//   logging.rs      — console + log-file tracing setup
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint discovery and loading
pub mod checkpoint;

/// Frozen model export and reload
pub mod frozen_graph;

/// Predictions file writer
pub mod predictions;

/// Test metrics CSV history
pub mod metrics;

/// Tracing subscriber with a per-run log file
pub mod logging;
