// ============================================================
// Layer 4 — NLI Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<NliSample>
// into model-ready tensors.
//
// This is also where token indices become vectors. Embeddings
// are pretrained and frozen, so instead of an Embedding module
// inside the model we copy rows straight out of the shared
// EmbeddingTable while building the batch:
//
//   Input:  N samples, each a row of 2*L indices
//   Output: premise    [N, L, D] float
//           hypothesis [N, L, D] float
//           masks      [N, L]    bool (true = padding)
//           labels     [N]       int
//
// The row is split at L (= max_len) into its two sentences.
//
// Reference: Burn Book §4 (Batcher)

use std::sync::Arc;

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::NliSample;
use crate::data::embeddings::EmbeddingTable;

// ─── NliBatch ─────────────────────────────────────────────────────────────────
/// A batch of sentence pairs ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct NliBatch<B: Backend> {
    /// Premise embeddings — shape: [batch_size, max_len, emb_dim]
    pub premise: Tensor<B, 3>,

    /// Padding mask for the premise — shape: [batch_size, max_len]
    pub premise_mask: Tensor<B, 2, Bool>,

    /// Hypothesis embeddings — shape: [batch_size, max_len, emb_dim]
    pub hypothesis: Tensor<B, 3>,

    /// Padding mask for the hypothesis — shape: [batch_size, max_len]
    pub hypothesis_mask: Tensor<B, 2, Bool>,

    /// Gold class indices — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── NliBatcher ───────────────────────────────────────────────────────────────
/// Holds the shared embedding table; cloning is cheap.
#[derive(Clone, Debug)]
pub struct NliBatcher {
    table: Arc<EmbeddingTable>,
}

impl NliBatcher {
    pub fn new(table: Arc<EmbeddingTable>) -> Self {
        Self { table }
    }

    /// Expand index rows into a flat [N * L * D] vector.
    fn expand(&self, rows: &[&[u32]]) -> Vec<f32> {
        let dim = self.table.dim();
        let len = rows.first().map_or(0, |r| r.len());
        let mut out = Vec::with_capacity(rows.len() * len * dim);
        for row in rows {
            for &idx in row.iter() {
                out.extend_from_slice(self.table.vector(idx));
            }
        }
        out
    }
}

/// true at every position >= the sentence length
fn padding_mask(lengths: &[usize], max_len: usize) -> Vec<bool> {
    lengths
        .iter()
        .flat_map(|&len| (0..max_len).map(move |pos| pos >= len))
        .collect()
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<B, NliSample, NliBatch<B>> for NliBatcher {
    fn batch(&self, items: Vec<NliSample>, device: &B::Device) -> NliBatch<B> {
        let batch_size = items.len();
        // All rows share the same max_len (pre-padded by the encoder)
        let max_len = items[0].max_len();
        let dim     = self.table.dim();

        let premise_rows:    Vec<&[u32]> = items.iter().map(|s| s.premise_ids()).collect();
        let hypothesis_rows: Vec<&[u32]> = items.iter().map(|s| s.hypothesis_ids()).collect();

        let premise_lens:    Vec<usize> = items.iter().map(|s| s.premise_len).collect();
        let hypothesis_lens: Vec<usize> = items.iter().map(|s| s.hypothesis_len).collect();

        let labels: Vec<i64> = items.iter().map(|s| s.label as i64).collect();

        // ── Create tensors ────────────────────────────────────────────────────
        let premise = Tensor::<B, 3>::from_data(
            TensorData::new(self.expand(&premise_rows), [batch_size, max_len, dim]),
            device,
        );
        let hypothesis = Tensor::<B, 3>::from_data(
            TensorData::new(self.expand(&hypothesis_rows), [batch_size, max_len, dim]),
            device,
        );

        let premise_mask = Tensor::<B, 2, Bool>::from_data(
            TensorData::new(padding_mask(&premise_lens, max_len), [batch_size, max_len]),
            device,
        );
        let hypothesis_mask = Tensor::<B, 2, Bool>::from_data(
            TensorData::new(padding_mask(&hypothesis_lens, max_len), [batch_size, max_len]),
            device,
        );

        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            device,
        );

        NliBatch { premise, premise_mask, hypothesis, hypothesis_mask, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::io::Cursor;

    type TestBackend = NdArray;

    fn batcher() -> NliBatcher {
        let table = EmbeddingTable::from_reader(Cursor::new("a 1 1\ncat 2 2\ndog 3 3\n")).unwrap();
        NliBatcher::new(Arc::new(table))
    }

    fn samples() -> Vec<NliSample> {
        vec![
            // premise "a cat", hypothesis "dog"
            NliSample { token_ids: vec![1, 2, 0, 3, 0, 0], premise_len: 2, hypothesis_len: 1, label: 0 },
            // premise "dog", hypothesis "a cat dog"
            NliSample { token_ids: vec![3, 0, 0, 1, 2, 3], premise_len: 1, hypothesis_len: 3, label: 2 },
        ]
    }

    #[test]
    fn test_shapes() {
        let device = Default::default();
        let batch: NliBatch<TestBackend> = batcher().batch(samples(), &device);

        assert_eq!(batch.premise.dims(), [2, 3, 2]);
        assert_eq!(batch.hypothesis.dims(), [2, 3, 2]);
        assert_eq!(batch.premise_mask.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);
    }

    #[test]
    fn test_indices_are_replaced_by_vectors() {
        let device = Default::default();
        let batch: NliBatch<TestBackend> = batcher().batch(samples(), &device);

        let premise = batch.premise.into_data().to_vec::<f32>().unwrap();
        assert_eq!(
            premise,
            vec![1.0, 1.0, 2.0, 2.0, 0.0, 0.0, 3.0, 3.0, 0.0, 0.0, 0.0, 0.0]
        );
        let hypothesis = batch.hypothesis.into_data().to_vec::<f32>().unwrap();
        assert_eq!(&hypothesis[6..], &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_masks_follow_lengths() {
        let device = Default::default();
        let batch: NliBatch<TestBackend> = batcher().batch(samples(), &device);

        let mask = batch.premise_mask.into_data().to_vec::<bool>().unwrap();
        assert_eq!(mask, vec![false, false, true, false, true, true]);
        let mask = batch.hypothesis_mask.into_data().to_vec::<bool>().unwrap();
        assert_eq!(mask, vec![false, true, true, false, false, false]);
    }

    #[test]
    fn test_labels() {
        let device = Default::default();
        let batch: NliBatch<TestBackend> = batcher().batch(samples(), &device);
        let labels: Vec<i64> = batch.labels.into_data().iter::<i64>().collect();
        assert_eq!(labels, vec![0, 2]);
    }

    #[test]
    fn test_padding_mask_helper() {
        assert_eq!(padding_mask(&[0, 2], 2), vec![true, true, false, false]);
    }
}
