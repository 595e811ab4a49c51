// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that define what the test
// driver works with:
//
//   example.rs    — one labelled text pair and the test set
//   prediction.rs — per-example prediction record, checkpoint choice
//   traits.rs     — seams between loading, scoring and the loop
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A labelled front/behind pair and the collection of them
pub mod example;

// What the model said about one example
pub mod prediction;

// Core abstractions (traits) that other layers implement
pub mod traits;
