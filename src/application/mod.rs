// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor math, no printing.
// Each use case wires data, ml and infra together for one
// CLI command.

// Train with early stopping, then score the test set
pub mod train_use_case;

// Score a checkpoint on one labelled file
pub mod evaluate_use_case;

// Classify a single sentence pair
pub mod predict_use_case;
