// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores the best checkpoint on one labelled TSV file.
// Everything needed to rebuild the model (max_len, layer
// sizes, embedding file) comes from the saved train_config.json;
// only the embedding file and device can be overridden.

use std::sync::Arc;

use anyhow::{bail, Result};
use burn::prelude::*;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::NliBatcher,
    dataset::{NliDataset, NliSample},
    embeddings::EmbeddingTable,
    loader::TsvPairLoader,
};
use crate::domain::traits::PairSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    backend::{cpu_device, gpu_device, CpuBackend, DeviceKind, GpuBackend},
    evaluator::{build_loader, evaluate, EpochStats},
    model::NliModel,
};

/// Load the best checkpoint and score it on already-encoded samples.
pub fn evaluate_samples<B: Backend>(
    cfg:          &TrainConfig,
    table:        Arc<EmbeddingTable>,
    samples:      Vec<NliSample>,
    ckpt_manager: &CheckpointManager,
    device:       &B::Device,
) -> Result<EpochStats> {
    if samples.is_empty() {
        bail!("Nothing to evaluate: dataset is empty");
    }

    let model: NliModel<B> = cfg.model_config(table.dim()).init(device);
    let model = ckpt_manager.load_model(model, device)?;

    let loader = build_loader::<B, _>(
        NliBatcher::new(table),
        NliDataset::new(samples),
        cfg.batch_size,
        cfg.num_workers,
        None,
        device,
    );
    Ok(evaluate(&model, &loader, "test"))
}

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    data_file:      String,
    embedding_file: Option<String>,
    device:         Option<DeviceKind>,
}

impl EvaluateUseCase {
    pub fn new(
        checkpoint_dir: String,
        data_file:      String,
        embedding_file: Option<String>,
        device:         Option<DeviceKind>,
    ) -> Self {
        Self { checkpoint_dir, data_file, embedding_file, device }
    }

    pub fn execute(&self) -> Result<EpochStats> {
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir)?;
        let cfg = ckpt_manager.load_config()?;

        match self.device.unwrap_or(cfg.device) {
            DeviceKind::Wgpu => self.execute_on::<GpuBackend>(&cfg, &ckpt_manager, &gpu_device()),
            DeviceKind::Cpu  => self.execute_on::<CpuBackend>(&cfg, &ckpt_manager, &cpu_device()),
        }
    }

    fn execute_on<B: Backend>(
        &self,
        cfg:          &TrainConfig,
        ckpt_manager: &CheckpointManager,
        device:       &B::Device,
    ) -> Result<EpochStats> {
        let embedding_file = self.embedding_file.as_deref().unwrap_or(&cfg.embedding_file);
        let table = Arc::new(EmbeddingTable::load(embedding_file)?);
        cfg.check_embedding_dim(&table)?;

        let pairs   = TsvPairLoader::new(&self.data_file, cfg.num_classes).load_all()?;
        let samples = cfg.encoder().encode_all(&table, &pairs)?;

        evaluate_samples::<B>(cfg, table, samples, ckpt_manager, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::ml::backend::CpuBackend;

    fn fixture(dir: &std::path::Path) -> TrainConfig {
        fs::write(dir.join("emb.txt"), "a 1 0\ncat 0 1\ndog 1 1\n").unwrap();
        fs::write(dir.join("eval.txt"), "0\ta cat\ta cat\n2\ta cat\ta dog\n1\tdog\tcat\n").unwrap();

        let cfg = TrainConfig {
            embedding_file: dir.join("emb.txt").display().to_string(),
            checkpoint_dir: dir.join("ckpt").display().to_string(),
            device:         DeviceKind::Cpu,
            max_len:        3,
            batch_size:     2,
            d_model:        4,
            num_heads:      2,
            num_layers:     1,
            d_ff:           8,
            d_hidden:       4,
            embedding_dim:  Some(2),
            ..TrainConfig::default()
        };
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir).unwrap();
        ckpt.save_config(&cfg).unwrap();
        let model: NliModel<CpuBackend> = cfg.model_config(2).init(&cpu_device());
        ckpt.save_model(&model).unwrap();
        cfg
    }

    #[test]
    fn test_evaluates_every_pair_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixture(dir.path());

        let stats = EvaluateUseCase::new(
            cfg.checkpoint_dir.clone(),
            dir.path().join("eval.txt").display().to_string(),
            None,
            None,
        )
        .execute()
        .unwrap();

        assert_eq!(stats.samples, 3);
        assert_eq!(stats.batches, 2);
        assert!(stats.accuracy() <= 1.0);
    }

    #[test]
    fn test_embedding_override_with_wrong_width_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixture(dir.path());
        fs::write(dir.path().join("emb3.txt"), "a 1 0 0\ncat 0 1 0\ndog 1 1 0\n").unwrap();

        let err = EvaluateUseCase::new(
            cfg.checkpoint_dir.clone(),
            dir.path().join("eval.txt").display().to_string(),
            Some(dir.path().join("emb3.txt").display().to_string()),
            None,
        )
        .execute()
        .unwrap_err();
        assert!(err.to_string().contains("2-d embeddings"), "{err}");
    }

    #[test]
    fn test_missing_checkpoint_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EvaluateUseCase::new(
            dir.path().display().to_string(),
            "eval.txt".into(),
            None,
            Some(DeviceKind::Cpu),
        )
        .execute();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_samples_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = fixture(dir.path());
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir).unwrap();
        let table = Arc::new(EmbeddingTable::load(&cfg.embedding_file).unwrap());
        let result = evaluate_samples::<CpuBackend>(&cfg, table, Vec::new(), &ckpt, &cpu_device());
        assert!(result.is_err());
    }
}
