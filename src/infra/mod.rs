// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting file concerns used by several other layers:
//
//   checkpoint.rs — best-model weights (Burn CompactRecorder)
//                   and the JSON training config needed to
//                   rebuild the model for evaluate/predict.
//
//   metrics.rs    — per-epoch loss/accuracy appended to CSV.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
