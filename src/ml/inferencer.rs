// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads the best checkpoint and classifies one sentence pair
// at a time. Uses the same encoder and batcher as training, so
// padding, truncation and embedding lookup are identical.
use std::sync::Arc;

use anyhow::Result;
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::batcher::{NliBatch, NliBatcher};
use crate::data::embeddings::EmbeddingTable;
use crate::data::encoder::PairEncoder;
use crate::domain::sentence_pair::SentencePair;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::NliModel;

pub struct Inferencer<B: Backend> {
    model:   NliModel<B>,
    encoder: PairEncoder,
    batcher: NliBatcher,
    table:   Arc<EmbeddingTable>,
    device:  B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        table:        Arc<EmbeddingTable>,
        device:       B::Device,
    ) -> Result<Self> {
        let cfg = ckpt_manager.load_config()?;
        cfg.check_embedding_dim(&table)?;

        let model: NliModel<B> = cfg.model_config(table.dim()).init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from '{}'", ckpt_manager.model_path().display());

        Ok(Self {
            model,
            encoder: PairEncoder::new(cfg.max_len, cfg.unknown_words),
            batcher: NliBatcher::new(table.clone()),
            table,
            device,
        })
    }

    /// Softmax probabilities over the classes for one pair.
    pub fn predict(&self, pair: &SentencePair) -> Result<Vec<f32>> {
        let sample = self.encoder.encode(&self.table, pair)?;
        let batch: NliBatch<B> = self.batcher.batch(vec![sample], &self.device);

        let logits = self.model.forward(
            batch.premise,
            batch.premise_mask,
            batch.hypothesis,
            batch.hypothesis_mask,
        );
        let probs = burn::tensor::activation::softmax(logits, 1)
            .into_data()
            .iter::<f32>()
            .collect();
        Ok(probs)
    }
}

/// Index of the largest probability (first one on ties).
pub fn argmax(probs: &[f32]) -> usize {
    probs
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &p)| if p > best.1 { (i, p) } else { best })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::io::Cursor;

    use crate::application::train_use_case::TrainConfig;

    type TestBackend = NdArray;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_predict_from_saved_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let table = Arc::new(EmbeddingTable::from_reader(Cursor::new("a 1 0\ncat 0 1\n")).unwrap());
        let device = Default::default();

        let cfg = TrainConfig {
            max_len: 3,
            d_model: 4,
            num_heads: 2,
            num_layers: 1,
            d_ff: 8,
            d_hidden: 4,
            ..TrainConfig::default()
        };
        ckpt.save_config(&cfg).unwrap();
        let model: NliModel<TestBackend> = cfg.model_config(table.dim()).init(&device);
        ckpt.save_model(&model).unwrap();

        let inf = Inferencer::<TestBackend>::from_checkpoint(&ckpt, table, device).unwrap();
        let probs = inf.predict(&SentencePair::from_text(0, "a cat", "cat")).unwrap();

        assert_eq!(probs.len(), 3);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_predict_unknown_word_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let table = Arc::new(EmbeddingTable::from_reader(Cursor::new("a 1 0\n")).unwrap());
        let device = Default::default();

        let cfg = TrainConfig { max_len: 2, d_model: 4, num_heads: 1, num_layers: 1, d_ff: 4, d_hidden: 4, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let model: NliModel<TestBackend> = cfg.model_config(table.dim()).init(&device);
        ckpt.save_model(&model).unwrap();

        let inf = Inferencer::<TestBackend>::from_checkpoint(&ckpt, table, device).unwrap();
        assert!(inf.predict(&SentencePair::from_text(0, "a zebra", "a")).is_err());
    }
}
