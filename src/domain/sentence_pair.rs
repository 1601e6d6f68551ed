// ============================================================
// Layer 3 — SentencePair Domain Type
// ============================================================
// One NLI example: a premise, a hypothesis, and the gold
// relationship between them as a class index.
//
// Example:
//   label:      0 (entailment)
//   premise:    ["A", "man", "plays", "guitar", "."]
//   hypothesis: ["A", "person", "makes", "music", "."]
//
// Sentences are kept as whitespace tokens. Mapping tokens to
// embedding indices happens later in data::encoder.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    /// Gold class index (column 1 of the dataset file)
    pub label: usize,

    /// Premise tokens (column 2)
    pub premise: Vec<String>,

    /// Hypothesis tokens (column 3)
    pub hypothesis: Vec<String>,
}

impl SentencePair {
    pub fn new(label: usize, premise: Vec<String>, hypothesis: Vec<String>) -> Self {
        Self { label, premise, hypothesis }
    }

    /// Build a pair by splitting both sentences on whitespace.
    pub fn from_text(label: usize, premise: &str, hypothesis: &str) -> Self {
        let split = |s: &str| s.split_whitespace().map(str::to_string).collect();
        Self::new(label, split(premise), split(hypothesis))
    }

    /// Length of the longer of the two sentences, in tokens.
    pub fn max_len(&self) -> usize {
        self.premise.len().max(self.hypothesis.len())
    }
}
