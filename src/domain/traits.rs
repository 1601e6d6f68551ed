// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits rather than to
// concrete readers or models:
//   - TsvPairLoader  implements PairSource
//   - PredictUseCase implements PairClassifier

use anyhow::Result;

use crate::domain::label::Prediction;
use crate::domain::sentence_pair::SentencePair;

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Anything that can produce labelled sentence pairs.
pub trait PairSource {
    /// Load every pair from this source, in file order.
    fn load_all(&self) -> Result<Vec<SentencePair>>;
}

// ─── PairClassifier ───────────────────────────────────────────────────────────
/// Anything that can label the relationship between two sentences.
pub trait PairClassifier {
    fn classify(&self, premise: &str, hypothesis: &str) -> Result<Prediction>;
}
