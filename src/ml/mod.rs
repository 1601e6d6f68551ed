// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All tensor math lives in this layer.
//
//   model.rs      — shared transformer sentence encoder plus
//                   a matching-feature classifier head
//
//   scheduler.rs  — reduce-on-plateau learning-rate policy
//
//   evaluator.rs  — data loaders and the no-grad pass used for
//                   dev/test scoring
//
//   trainer.rs    — epoch loop: SGD updates, dev scoring,
//                   checkpointing, LR decay, early stopping
//
//   inferencer.rs — loads the best checkpoint and classifies
//                   single sentence pairs
//
//   backend.rs    — WGPU / ndarray backend selection
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

pub mod backend;

/// Sentence-pair encoder + classifier
pub mod model;

/// ReduceLROnPlateau-style scheduler
pub mod scheduler;

/// Loss/accuracy over a data loader
pub mod evaluator;

/// Training loop with early stopping
pub mod trainer;

/// Checkpoint-backed single-pair prediction
pub mod inferencer;
