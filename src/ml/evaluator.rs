// ============================================================
// Layer 5 — Evaluation Pass
// ============================================================
// One pass over a data loader without gradient updates, used
// for the dev set every epoch and the test set at the end.
// The same EpochStats accumulator also tracks the training
// pass inside the trainer.
//
// Evaluation runs on the inner (non-autodiff) backend: callers
// pass model.valid(), which also turns dropout off.

use std::sync::Arc;

use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    prelude::*,
};

use crate::data::batcher::{NliBatch, NliBatcher};
use crate::data::dataset::NliSample;
use crate::ml::model::NliModel;

pub type NliLoader<B> = Arc<dyn DataLoader<B, NliBatch<B>>>;

/// Build a data loader over encoded samples on `device`.
/// `shuffle` carries the seed; None keeps file order.
pub fn build_loader<B, D>(
    batcher:     NliBatcher,
    dataset:     D,
    batch_size:  usize,
    num_workers: usize,
    shuffle:     Option<u64>,
    device:      &B::Device,
) -> NliLoader<B>
where
    B: Backend,
    D: Dataset<NliSample> + 'static,
{
    let mut builder = DataLoaderBuilder::<B, NliSample, NliBatch<B>>::new(batcher)
        .batch_size(batch_size)
        .num_workers(num_workers)
        .set_device(device.clone());
    if let Some(seed) = shuffle {
        builder = builder.shuffle(seed);
    }
    builder.build(dataset)
}

/// Running totals for one pass over a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpochStats {
    pub loss_sum: f64,
    pub batches:  usize,
    pub correct:  usize,
    pub samples:  usize,
}

impl EpochStats {
    pub fn record(&mut self, batch_loss: f64, correct: usize, samples: usize) {
        self.loss_sum += batch_loss;
        self.batches  += 1;
        self.correct  += correct;
        self.samples  += samples;
    }

    /// Mean of the per-batch losses; NaN when no batch was seen.
    pub fn avg_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }

    pub fn accuracy(&self) -> f64 {
        if self.samples > 0 { self.correct as f64 / self.samples as f64 } else { 0.0 }
    }
}

/// Number of rows whose argmax matches the label.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns shape [batch, 1] — flatten to [batch]
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    let correct: i64 = predicted
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as usize
}

/// Run `model` over every batch of `loader` and accumulate loss/accuracy.
pub fn evaluate<B: Backend>(model: &NliModel<B>, loader: &NliLoader<B>, mode: &str) -> EpochStats {
    let mut stats = EpochStats::default();

    for batch in loader.iter() {
        let batch_size = batch.labels.dims()[0];
        let (loss, logits, labels) = model.forward_loss(batch);

        let loss_val: f64 = loss.into_scalar().elem::<f64>();
        stats.record(loss_val, count_correct(logits, labels), batch_size);

        tracing::debug!("{mode} batch {} loss {:.4}", stats.batches, stats.avg_loss());
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::io::Cursor;

    use crate::data::dataset::NliDataset;
    use crate::data::embeddings::EmbeddingTable;
    use crate::ml::model::NliModelConfig;

    type TestBackend = NdArray;

    #[test]
    fn test_stats_averages() {
        let mut s = EpochStats::default();
        s.record(1.0, 3, 4);
        s.record(2.0, 1, 4);
        assert!((s.avg_loss() - 1.5).abs() < 1e-12);
        assert!((s.accuracy() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_stats() {
        let s = EpochStats::default();
        assert!(s.avg_loss().is_nan());
        assert_eq!(s.accuracy(), 0.0);
    }

    #[test]
    fn test_count_correct() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![0.9f32, 0.1, 0.0, 0.2, 0.7, 0.1, 0.1, 0.1, 0.8], [3, 3]),
            &device,
        );
        let labels = Tensor::<TestBackend, 1, Int>::from_data(TensorData::new(vec![0i64, 2, 2], [3]), &device);
        assert_eq!(count_correct(logits, labels), 2);
    }

    #[test]
    fn test_evaluate_visits_every_sample() {
        let device = Default::default();
        let table = EmbeddingTable::from_reader(Cursor::new("a 1 0\nb 0 1\n")).unwrap();
        let samples: Vec<NliSample> = (0..5)
            .map(|i| NliSample { token_ids: vec![1, 2, 2, 0], premise_len: 2, hypothesis_len: 1, label: i % 3 })
            .collect();

        let loader = build_loader::<TestBackend, _>(
            NliBatcher::new(Arc::new(table)),
            NliDataset::new(samples),
            2,
            1,
            None,
            &device,
        );
        let model = NliModelConfig::new(2, 2, 3)
            .with_d_model(4)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(8)
            .with_d_hidden(4)
            .init::<TestBackend>(&device);

        let stats = evaluate(&model, &loader, "test");
        assert_eq!(stats.samples, 5);
        assert_eq!(stats.batches, 3);
        assert!(stats.avg_loss().is_finite());
    }
}
