// ============================================================
// Layer 4 — Train/Dev Splitter
// ============================================================
// Used only when no dev file is given: carves a dev set out of
// the training pairs so the plateau scheduler and checkpointing
// still have something to monitor.
//
// The shuffle is seeded, so the same seed always produces the
// same split and a resumed run evaluates on the same dev set.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, dev).
///
/// `train_fraction` is clamped to [0, 1]; e.g. 0.9 keeps 90% for
/// training.
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let fraction = train_fraction.clamp(0.0, 1.0);
    let split_at = ((total as f64) * fraction).round() as usize;
    let split_at = split_at.min(total);

    // After this: samples = [0..split_at], dev = [split_at..total]
    let dev = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} dev (seed {})",
        samples.len(),
        dev.len(),
        seed,
    );

    (samples, dev)
}
