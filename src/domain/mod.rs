// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the NLI task.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// The data and ml layers translate these types into tensors;
// the application layer wires them together.

// A labelled premise/hypothesis pair
pub mod sentence_pair;

// Class names and model predictions
pub mod label;

// Core abstractions (traits) that other layers implement
pub mod traits;
