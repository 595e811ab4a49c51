// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per use case:
//
//   test   — restore a checkpoint, score the test set, export
//            the frozen model, write predictions and metrics
//   freeze — restore a checkpoint and export the frozen model
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// The backend is a generic parameter: the CLI decides whether
// the run happens on the CPU (NdArray) or the GPU (Wgpu).
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Restore + export, shared by both workflows
pub mod freeze_use_case;

// The full evaluation workflow
pub mod test_use_case;
