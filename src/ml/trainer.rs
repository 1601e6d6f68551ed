// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Runs epochs until the plateau scheduler has decayed the
// learning rate below `stop_lr`:
//
//   loop {
//     train one epoch        (SGD + weight decay, Autodiff backend)
//     evaluate dev set       (model.valid(), inner backend)
//     checkpoint            if dev loss improved
//     scheduler.step(dev_acc)
//     stop                  if lr < stop_lr or max_epochs reached
//   }
//
// Key Burn insight:
//   - Training uses B (Autodiff<...>) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - The dev loader must therefore also use B::InnerBackend
//
// Reference: Burn Book §5 (Training)

use std::sync::Arc;

use anyhow::{bail, Result};
use burn::{
    module::AutodiffModule,
    optim::{decay::WeightDecayConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::NliBatcher, dataset::NliDataset, embeddings::EmbeddingTable};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::evaluator::{build_loader, count_correct, evaluate, EpochStats};
use crate::ml::model::NliModel;
use crate::ml::scheduler::PlateauScheduler;

/// What a finished training run achieved.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub epochs:        usize,
    pub best_dev_loss: f64,
    /// Best dev accuracy seen by the scheduler
    pub best_dev_acc:  f64,
    pub final_lr:      f64,
    /// Whether training started from an existing best checkpoint
    pub resumed:       bool,
}

pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    table:         Arc<EmbeddingTable>,
    train_dataset: NliDataset,
    dev_dataset:   NliDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainingSummary> {

    // ── Build model (resume from the best checkpoint if present) ─────────────
    let model_cfg = cfg.model_config(table.dim());
    let mut model: NliModel<B> = model_cfg.init(&device);
    let resumed = ckpt_manager.has_model();
    if resumed {
        tracing::info!("Resuming from '{}'", ckpt_manager.model_path().display());
        model = ckpt_manager.load_model(model, &device)?;
    }
    tracing::info!(
        "Model ready: {} encoder layers, d_model={}, {} classes",
        cfg.num_layers, cfg.d_model, cfg.num_classes
    );

    // ── SGD with L2 weight decay ──────────────────────────────────────────────
    let optim_cfg = SgdConfig::new()
        .with_weight_decay(Some(WeightDecayConfig::new(cfg.weight_decay)));
    let mut optim = optim_cfg.init::<B, NliModel<B>>();
    let mut scheduler = PlateauScheduler::new(cfg.lr, cfg.plateau_config());

    // ── Data loaders ──────────────────────────────────────────────────────────
    let batcher = NliBatcher::new(table);
    let train_loader = build_loader::<B, _>(
        batcher.clone(),
        train_dataset,
        cfg.batch_size,
        cfg.num_workers,
        cfg.shuffle_seed,
        &device,
    );
    let dev_loader = build_loader::<B::InnerBackend, _>(
        batcher,
        dev_dataset,
        cfg.batch_size,
        cfg.num_workers,
        None,
        &device,
    );

    tracing::info!("Logging epoch metrics to '{}'", metrics.csv_path().display());

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut best_dev_loss = f64::INFINITY;
    let mut epoch = 0usize;

    loop {
        epoch += 1;
        let lr = scheduler.lr();

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_stats = EpochStats::default();

        for batch in train_loader.iter() {
            let batch_size = batch.labels.dims()[0];
            let (loss, logits, labels) = model.forward_loss(batch);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_stats.record(loss_val, count_correct(logits, labels), batch_size);

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);

            tracing::debug!(
                "train epoch {epoch} batch {} loss {:.4}",
                train_stats.batches,
                train_stats.avg_loss()
            );
        }

        // ── Dev phase (dropout off, no autodiff) ─────────────────────────────
        let dev_stats = evaluate(&model.valid(), &dev_loader, "dev");

        println!(
            "Epoch {:>3} | lr={:.2e} | train_loss={:.3} acc={:.3} | dev_loss={:.3} acc={:.3}",
            epoch,
            lr,
            train_stats.avg_loss(),
            train_stats.accuracy(),
            dev_stats.avg_loss(),
            dev_stats.accuracy(),
        );

        let row = EpochMetrics::new(
            epoch,
            lr,
            train_stats.avg_loss(),
            train_stats.accuracy(),
            dev_stats.avg_loss(),
            dev_stats.accuracy(),
        );
        metrics.log(&row)?;

        if !row.dev_loss.is_finite() {
            bail!(
                "Dev loss is {} at epoch {epoch}: training diverged (lr={lr:.2e}); \
                 try a lower --lr",
                row.dev_loss
            );
        }

        if row.is_improvement(best_dev_loss) {
            best_dev_loss = row.dev_loss;
            ckpt_manager.save_model(&model)?;
            tracing::info!("Dev loss improved to {:.4}; checkpoint saved", best_dev_loss);
        }

        scheduler.step(dev_stats.accuracy());

        if scheduler.lr() < cfg.stop_lr {
            tracing::info!(
                "Learning rate {:.2e} fell below {:.2e}; stopping",
                scheduler.lr(),
                cfg.stop_lr
            );
            break;
        }
        if cfg.max_epochs.is_some_and(|max| epoch >= max) {
            tracing::info!("Reached max_epochs={epoch}; stopping");
            break;
        }
    }

    Ok(TrainingSummary {
        epochs: epoch,
        best_dev_loss,
        best_dev_acc: scheduler.best(),
        final_lr: scheduler.lr(),
        resumed,
    })
}
