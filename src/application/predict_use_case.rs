// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Classifies a single premise/hypothesis pair with the best
// checkpoint and names the winning class.

use std::sync::Arc;

use anyhow::Result;
use burn::prelude::*;

use crate::data::embeddings::EmbeddingTable;
use crate::domain::{
    label::{LabelSet, Prediction},
    sentence_pair::SentencePair,
    traits::PairClassifier,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{argmax, Inferencer};

pub struct PredictUseCase<B: Backend> {
    inferencer: Inferencer<B>,
    labels:     LabelSet,
}

impl<B: Backend> PredictUseCase<B> {
    /// `embedding_file` overrides the path saved at training time.
    pub fn new(
        checkpoint_dir: &str,
        embedding_file: Option<&str>,
        device:         B::Device,
    ) -> Result<Self> {
        let ckpt_manager = CheckpointManager::new(checkpoint_dir)?;
        let cfg = ckpt_manager.load_config()?;

        let table = Arc::new(EmbeddingTable::load(
            embedding_file.unwrap_or(&cfg.embedding_file),
        )?);
        let inferencer = Inferencer::from_checkpoint(&ckpt_manager, table, device)?;

        Ok(Self { inferencer, labels: cfg.labels() })
    }
}

impl<B: Backend> PairClassifier for PredictUseCase<B> {
    fn classify(&self, premise: &str, hypothesis: &str) -> Result<Prediction> {
        // Label is unknown at prediction time; 0 is a placeholder
        let pair  = SentencePair::from_text(0, premise, hypothesis);
        let probs = self.inferencer.predict(&pair)?;
        let label = argmax(&probs);

        tracing::debug!("Probabilities: {:?}", probs);
        Ok(Prediction { label, name: self.labels.name(label), probabilities: probs })
    }
}
