// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate config
//   Step 2: Load embedding table        (Layer 4 - data)
//   Step 3: Read train/dev/test pairs   (Layer 4 - data)
//   Step 4: Encode to fixed-length rows (Layer 4 - data)
//   Step 5: Split dev from train if no dev file was given
//   Step 6: Save config                 (Layer 6 - infra)
//   Step 7: Run training loop           (Layer 5 - ml)
//   Step 8: Score the best checkpoint on the test set

use std::sync::Arc;

use anyhow::{bail, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::application::evaluate_use_case::evaluate_samples;
use crate::data::{
    dataset::{NliDataset, NliSample},
    embeddings::EmbeddingTable,
    encoder::{PairEncoder, UnknownWordPolicy},
    loader::TsvPairLoader,
    splitter::split_train_val,
};
use crate::domain::{label::LabelSet, traits::PairSource};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    backend::{cpu_device, gpu_device, CpuTrainBackend, DeviceKind, GpuTrainBackend},
    evaluator::EpochStats,
    model::NliModelConfig,
    scheduler::{PlateauConfig, PlateauMode},
    trainer::{run_training, TrainingSummary},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All paths and hyperparameters for a training run.
// Saved as train_config.json so evaluate/predict can rebuild the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub embedding_file:   String,
    pub train_file:       String,
    pub dev_file:         Option<String>,
    pub test_file:        Option<String>,
    pub checkpoint_dir:   String,
    pub device:           DeviceKind,

    // Data
    pub max_len:          usize,
    pub batch_size:       usize,
    pub num_workers:      usize,
    pub shuffle_seed:     Option<u64>,
    pub dev_fraction:     f64,
    pub split_seed:       u64,
    pub num_classes:      usize,
    pub label_names:      Vec<String>,
    pub unknown_words:    UnknownWordPolicy,
    /// Expected embedding width; filled from the table when saved
    pub embedding_dim:    Option<usize>,

    // Optimisation
    pub lr:               f64,
    pub weight_decay:     f32,
    pub plateau_factor:   f64,
    pub plateau_patience: usize,
    pub stop_lr:          f64,
    pub max_epochs:       Option<usize>,

    // Model
    pub d_model:          usize,
    pub num_heads:        usize,
    pub num_layers:       usize,
    pub d_ff:             usize,
    pub d_hidden:         usize,
    pub dropout:          f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            embedding_file:   "data/glove.840B.300d.txt".to_string(),
            train_file:       "dataset/train.txt".to_string(),
            dev_file:         Some("dataset/dev.txt".to_string()),
            test_file:        Some("dataset/test.txt".to_string()),
            checkpoint_dir:   "checkpoints".to_string(),
            device:           DeviceKind::default(),
            max_len:          82,
            batch_size:       64,
            num_workers:      1,
            shuffle_seed:     None,
            dev_fraction:     0.1,
            split_seed:       42,
            num_classes:      3,
            label_names:      LabelSet::default().names().to_vec(),
            unknown_words:    UnknownWordPolicy::default(),
            embedding_dim:    None,
            lr:               0.1,
            weight_decay:     0.01,
            plateau_factor:   0.2,
            plateau_patience: 0,
            stop_lr:          1e-5,
            max_epochs:       None,
            d_model:          256,
            num_heads:        4,
            num_layers:       2,
            d_ff:             512,
            d_hidden:         256,
            dropout:          0.1,
        }
    }
}

impl TrainConfig {
    /// Reject settings that would fail deep inside Burn.
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            bail!("max_len must be positive");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if self.num_classes < 2 {
            bail!("num_classes must be at least 2");
        }
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            bail!("d_model ({}) must be divisible by num_heads ({})", self.d_model, self.num_heads);
        }
        if !(self.lr > 0.0) {
            bail!("lr must be positive");
        }
        if !(0.0 < self.plateau_factor && self.plateau_factor < 1.0) {
            bail!("plateau_factor must be in (0, 1)");
        }
        if self.dev_file.is_none() && !(0.0 < self.dev_fraction && self.dev_fraction < 1.0) {
            bail!("dev_fraction must be in (0, 1) when no dev file is given");
        }
        if self.label_names.len() != self.num_classes {
            tracing::warn!(
                "{} label names for {} classes; missing names print as class_<i>",
                self.label_names.len(),
                self.num_classes
            );
        }
        Ok(())
    }

    /// Fail if `embedding_dim` is pinned and the table has another width.
    pub fn check_embedding_dim(&self, table: &EmbeddingTable) -> Result<()> {
        match self.embedding_dim {
            Some(dim) if dim != table.dim() => {
                bail!("Expected {dim}-d embeddings, got {}-d", table.dim())
            }
            _ => Ok(()),
        }
    }

    pub fn model_config(&self, embedding_dim: usize) -> NliModelConfig {
        NliModelConfig::new(embedding_dim, self.max_len, self.num_classes)
            .with_d_model(self.d_model)
            .with_num_heads(self.num_heads)
            .with_num_layers(self.num_layers)
            .with_d_ff(self.d_ff)
            .with_d_hidden(self.d_hidden)
            .with_dropout(self.dropout)
    }

    /// Scheduler monitors dev accuracy, so mode is always Max.
    pub fn plateau_config(&self) -> PlateauConfig {
        PlateauConfig {
            mode:     PlateauMode::Max,
            factor:   self.plateau_factor,
            patience: self.plateau_patience,
            ..PlateauConfig::default()
        }
    }

    pub fn labels(&self) -> LabelSet {
        LabelSet::new(self.label_names.clone())
    }

    pub fn encoder(&self) -> PairEncoder {
        PairEncoder::new(self.max_len, self.unknown_words)
    }
}

/// Result of `TrainUseCase::execute`.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub summary: TrainingSummary,
    /// Test-set scores of the best checkpoint, if a test file was given
    pub test:    Option<EpochStats>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline on the configured device.
    pub fn execute(&self) -> Result<TrainOutcome> {
        match self.config.device {
            DeviceKind::Wgpu => self.execute_on::<GpuTrainBackend>(gpu_device()),
            DeviceKind::Cpu  => self.execute_on::<CpuTrainBackend>(cpu_device()),
        }
    }

    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainOutcome> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Embedding table ───────────────────────────────────────────
        let table = Arc::new(EmbeddingTable::load(&cfg.embedding_file)?);
        cfg.check_embedding_dim(&table)?;

        // ── Steps 3 + 4: Read and encode datasets ─────────────────────────────
        let encoder = cfg.encoder();
        let load = |path: &str| -> Result<Vec<NliSample>> {
            let pairs = TsvPairLoader::new(path, cfg.num_classes).load_all()?;
            encoder.encode_all(&table, &pairs)
        };

        let train_samples = load(&cfg.train_file)?;
        let test_samples = cfg.test_file.as_deref().map(|path| load(path)).transpose()?;

        // ── Step 5: Dev set ───────────────────────────────────────────────────
        let (train_samples, dev_samples) = match cfg.dev_file.as_deref() {
            Some(path) => (train_samples, load(path)?),
            None => {
                tracing::info!(
                    "No dev file; holding out {:.0}% of training pairs",
                    cfg.dev_fraction * 100.0
                );
                split_train_val(train_samples, 1.0 - cfg.dev_fraction, cfg.split_seed)
            }
        };
        if train_samples.is_empty() {
            bail!("Training set is empty");
        }
        if dev_samples.is_empty() {
            bail!("Dev set is empty");
        }
        tracing::info!("{} train pairs, {} dev pairs", train_samples.len(), dev_samples.len());

        // ── Step 6: Save config for evaluate/predict ──────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let saved = TrainConfig { embedding_dim: Some(table.dim()), ..cfg.clone() };
        ckpt_manager.save_config(&saved)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 7: Training loop (Layer 5) ───────────────────────────────────
        let summary = run_training::<B>(
            &saved,
            table.clone(),
            NliDataset::new(train_samples),
            NliDataset::new(dev_samples),
            &ckpt_manager,
            &metrics,
            device.clone(),
        )?;

        // ── Step 8: Test evaluation on the best checkpoint ────────────────────
        let test = match test_samples {
            Some(samples) => Some(evaluate_samples::<B::InnerBackend>(
                &saved,
                table,
                samples,
                &ckpt_manager,
                &device,
            )?),
            None => None,
        };

        Ok(TrainOutcome { summary, test })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use std::fs;

    type TestBackend = Autodiff<NdArray>;

    fn write_fixture(dir: &std::path::Path) {
        fs::write(
            dir.join("emb.txt"),
            "a 1 0 0\ncat 0 1 0\ndog 0 0 1\nsleeps 1 1 0\nbarks 0 1 1\n",
        )
        .unwrap();
        let rows = "0\ta cat sleeps\ta cat sleeps\n\
                    2\ta cat sleeps\ta dog barks\n\
                    1\ta dog\ta dog barks\n\
                    0\ta dog barks\ta dog barks\n\
                    2\ta dog sleeps\ta cat barks\n\
                    1\tcat\ta cat sleeps\n";
        fs::write(dir.join("train.txt"), rows.repeat(3)).unwrap();
        fs::write(dir.join("test.txt"), rows).unwrap();
    }

    fn config(dir: &std::path::Path) -> TrainConfig {
        let p = |name: &str| dir.join(name).display().to_string();
        TrainConfig {
            embedding_file: p("emb.txt"),
            train_file:     p("train.txt"),
            dev_file:       None,
            test_file:      Some(p("test.txt")),
            checkpoint_dir: p("ckpt"),
            device:         DeviceKind::Cpu,
            max_len:        4,
            batch_size:     4,
            d_model:        4,
            num_heads:      2,
            num_layers:     1,
            d_ff:           8,
            d_hidden:       4,
            dev_fraction:   0.25,
            max_epochs:     Some(2),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_heads_must_divide_d_model() {
        let cfg = TrainConfig { d_model: 10, num_heads: 4, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_dev_fraction_without_dev_file() {
        let cfg = TrainConfig { dev_file: None, dev_fraction: 1.0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_model_config_follows_train_config() {
        let cfg = TrainConfig::default();
        let m = cfg.model_config(300);
        assert_eq!(m.embedding_dim, 300);
        assert_eq!(m.max_len, 82);
        assert_eq!(m.num_classes, 3);
        assert_eq!(m.d_model, 256);
    }

    #[test]
    fn test_end_to_end_train_with_split_dev_and_test() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let cfg = config(dir.path());

        let outcome = TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap();

        assert_eq!(outcome.summary.epochs, 2);
        let test = outcome.test.unwrap();
        assert_eq!(test.samples, 6);

        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir).unwrap();
        assert!(ckpt.has_model());
        assert_eq!(ckpt.load_config().unwrap().embedding_dim, Some(3));
    }

    #[test]
    fn test_embedding_dim_mismatch_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let cfg = TrainConfig { embedding_dim: Some(300), ..config(dir.path()) };
        assert!(TrainUseCase::new(cfg).execute_on::<TestBackend>(Default::default()).is_err());
    }

    #[test]
    fn test_unknown_word_in_train_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        fs::write(dir.path().join("train.txt"), "0\ta zebra\ta cat\n").unwrap();
        let result = TrainUseCase::new(config(dir.path())).execute_on::<TestBackend>(Default::default());
        assert!(result.is_err());
    }
}
