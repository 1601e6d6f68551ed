// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - lr:         learning rate used for the epoch
//   - train_loss: mean cross-entropy over training batches
//   - train_acc:  fraction of training pairs classified correctly
//   - dev_loss:   mean cross-entropy over dev batches
//   - dev_acc:    fraction of dev pairs classified correctly
//
// Output file: <checkpoint_dir>/metrics.csv
//
//   epoch,lr,train_loss,train_acc,dev_loss,dev_acc
//   1,0.100000,1.043100,0.441200,0.981300,0.532000
//   2,0.100000,0.921700,0.560300,0.903400,0.587100
//
// Rows are appended, so a resumed run continues the same file.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,lr,train_loss,train_acc,dev_loss,dev_acc";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub lr:         f64,
    pub train_loss: f64,
    pub train_acc:  f64,
    pub dev_loss:   f64,
    pub dev_acc:    f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        lr:         f64,
        train_loss: f64,
        train_acc:  f64,
        dev_loss:   f64,
        dev_acc:    f64,
    ) -> Self {
        Self { epoch, lr, train_loss, train_acc, dev_loss, dev_acc }
    }

    /// Returns true if this epoch improved over the previous best dev_loss
    pub fn is_improvement(&self, best_dev_loss: f64) -> bool {
        self.dev_loss < best_dev_loss
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            self.epoch, self.lr, self.train_loss, self.train_acc, self.dev_loss, self.dev_acc,
        )
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger writing to `<dir>/metrics.csv`.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: dev_loss={:.4}, dev_acc={:.4}",
            m.epoch,
            m.dev_loss,
            m.dev_acc,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
