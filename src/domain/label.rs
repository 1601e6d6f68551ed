// ============================================================
// Layer 3 — Labels and Predictions
// ============================================================
// Dataset files store the relationship as an integer. LabelSet
// gives those integers human-readable names for the `predict`
// command; the model itself only ever sees indices.

use serde::{Deserialize, Serialize};

/// Ordered class names, index i names class i.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name for a class index, falling back to the index itself
    /// when the set has fewer names than the model has classes.
    pub fn name(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{index}"))
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new(
            ["entailment", "neutral", "contradiction"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

/// The classifier's answer for one sentence pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Argmax class index
    pub label: usize,
    /// Name of `label` according to the LabelSet
    pub name: String,
    /// Softmax probability per class
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Probability assigned to the predicted class
    pub fn confidence(&self) -> f32 {
        self.probabilities.get(self.label).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let labels = LabelSet::default();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.name(0), "entailment");
        assert_eq!(labels.name(2), "contradiction");
    }

    #[test]
    fn test_missing_name_falls_back_to_index() {
        let labels = LabelSet::new(vec!["yes".into()]);
        assert_eq!(labels.name(4), "class_4");
    }

    #[test]
    fn test_confidence_reads_predicted_class() {
        let p = Prediction { label: 1, name: "neutral".into(), probabilities: vec![0.1, 0.7, 0.2] };
        assert!((p.confidence() - 0.7).abs() < 1e-6);
    }
}
