use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One encoded sentence pair.
/// Row format: premise ids ++ hypothesis ids, each padded to max_len.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NliSample {
    pub token_ids:      Vec<u32>,
    pub premise_len:    usize,
    pub hypothesis_len: usize,
    pub label:          usize,
}

impl NliSample {
    /// Per-sentence padded length (half the row).
    pub fn max_len(&self) -> usize {
        self.token_ids.len() / 2
    }

    pub fn premise_ids(&self) -> &[u32] {
        &self.token_ids[..self.max_len()]
    }

    pub fn hypothesis_ids(&self) -> &[u32] {
        &self.token_ids[self.max_len()..]
    }
}

pub struct NliDataset {
    samples: Vec<NliSample>,
}

impl NliDataset {
    pub fn new(samples: Vec<NliSample>) -> Self { Self { samples } }
}

impl Dataset<NliSample> for NliDataset {
    fn get(&self, index: usize) -> Option<NliSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halves_split_at_max_len() {
        let s = NliSample { token_ids: vec![1, 2, 0, 3, 0, 0], premise_len: 2, hypothesis_len: 1, label: 0 };
        assert_eq!(s.max_len(), 3);
        assert_eq!(s.premise_ids(), &[1, 2, 0]);
        assert_eq!(s.hypothesis_ids(), &[3, 0, 0]);
    }

    #[test]
    fn test_dataset_get_and_len() {
        let s = NliSample { token_ids: vec![1, 2], premise_len: 1, hypothesis_len: 1, label: 2 };
        let ds = NliDataset::new(vec![s]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0).map(|s| s.label), Some(2));
        assert!(ds.get(1).is_none());
    }
}
