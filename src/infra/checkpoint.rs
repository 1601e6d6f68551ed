// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What lives in the checkpoint directory:
//   best_model.mpk      — weights with the lowest dev loss so far
//   train_config.json   — paths + hyperparameters of the run
//   metrics.csv         — one row per epoch (see metrics.rs)
//
// Only the best model is kept: the trainer overwrites it each
// time dev loss improves, and resumes from it when it already
// exists at startup.
//
// The config is saved separately because `evaluate` and
// `predict` must rebuild the exact architecture (d_model,
// num_layers, max_len, ...) before loading weights into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::CompactRecorder,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::NliModel;

const MODEL_STEM:  &str = "best_model";
// CompactRecorder = named MessagePack, half precision, uncompressed
const MODEL_EXT:   &str = "mpk";
const CONFIG_FILE: &str = "train_config.json";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `dir`, creating the directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Full path of the weights file, including the recorder's extension.
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_STEM).with_extension(MODEL_EXT)
    }

    pub fn has_model(&self) -> bool {
        self.model_path().exists()
    }

    /// Overwrite the best-model checkpoint with `model`'s weights.
    pub fn save_model<B: Backend>(&self, model: &NliModel<B>) -> Result<()> {
        // Recorder appends the extension itself
        let path = self.dir.join(MODEL_STEM);
        model
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint '{}'", self.model_path().display());
        Ok(())
    }

    /// Load the best-model weights into `model`.
    /// `model` must have the same architecture as the saved one.
    pub fn load_model<B: Backend>(
        &self,
        model:  NliModel<B>,
        device: &B::Device,
    ) -> Result<NliModel<B>> {
        let path = self.dir.join(MODEL_STEM);
        model
            .load_file(path, &CompactRecorder::new(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    self.model_path().display()
                )
            })
    }

    /// Save the training configuration as pretty JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the configuration written by `save_config`.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Run 'train' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }
}
