// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `evaluate` and `predict`
// and all their configurable flags.
//
// Defaults for `train` mirror the reference training recipe:
// SGD lr=0.1, weight decay 0.01, batch 64, 82 tokens per
// sentence, LR x0.2 whenever dev accuracy stalls, stop once
// LR < 1e-5.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::data::encoder::UnknownWordPolicy;
use crate::ml::backend::DeviceKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the NLI classifier, then score the test file
    Train(TrainArgs),

    /// Score the best checkpoint on a labelled TSV file
    Evaluate(EvaluateArgs),

    /// Classify one premise/hypothesis pair
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Pretrained word vectors, one "word v1 ... vD" per line
    #[arg(long)]
    pub embeddings: String,

    /// Training pairs: label<TAB>premise<TAB>hypothesis
    #[arg(long, default_value = "dataset/train.txt")]
    pub train: String,

    /// Dev pairs; when omitted, --dev-fraction of train is held out
    #[arg(long)]
    pub dev: Option<String>,

    /// Test pairs scored after training
    #[arg(long)]
    pub test: Option<String>,

    /// Directory for best_model, train_config.json and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, value_enum, default_value_t = DeviceKind::Wgpu)]
    pub device: DeviceKind,

    /// Tokens per sentence after padding/truncation
    #[arg(long, default_value_t = 82)]
    pub max_len: usize,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Data loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    /// Shuffle training batches with this seed (file order if omitted)
    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    #[arg(long, default_value_t = 0.1)]
    pub dev_fraction: f64,

    #[arg(long, default_value_t = 42)]
    pub split_seed: u64,

    #[arg(long, default_value_t = 3)]
    pub num_classes: usize,

    /// Class names in label-index order
    #[arg(long, value_delimiter = ',', default_value = "entailment,neutral,contradiction")]
    pub labels: Vec<String>,

    /// What to do with words missing from the embedding file
    #[arg(long, value_enum, default_value_t = UnknownWordPolicy::Error)]
    pub unknown_words: UnknownWordPolicy,

    /// Fail unless the embedding file has exactly this width
    #[arg(long)]
    pub embedding_dim: Option<usize>,

    /// Initial SGD learning rate
    #[arg(long, default_value_t = 0.1)]
    pub lr: f64,

    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f32,

    /// LR multiplier when dev accuracy stops improving
    #[arg(long, default_value_t = 0.2)]
    pub plateau_factor: f64,

    /// Stalled epochs tolerated before the LR is reduced
    #[arg(long, default_value_t = 0)]
    pub plateau_patience: usize,

    /// Stop once the LR falls below this
    #[arg(long, default_value_t = 1e-5)]
    pub stop_lr: f64,

    /// Hard cap on epochs (unbounded if omitted)
    #[arg(long)]
    pub max_epochs: Option<usize>,

    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    #[arg(long, default_value_t = 512)]
    pub d_ff: usize,

    /// Hidden width of the classifier head
    #[arg(long, default_value_t = 256)]
    pub d_hidden: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            embedding_file:   a.embeddings,
            train_file:       a.train,
            dev_file:         a.dev,
            test_file:        a.test,
            checkpoint_dir:   a.checkpoint_dir,
            device:           a.device,
            max_len:          a.max_len,
            batch_size:       a.batch_size,
            num_workers:      a.num_workers,
            shuffle_seed:     a.shuffle_seed,
            dev_fraction:     a.dev_fraction,
            split_seed:       a.split_seed,
            num_classes:      a.num_classes,
            label_names:      a.labels,
            unknown_words:    a.unknown_words,
            embedding_dim:    a.embedding_dim,
            lr:               a.lr,
            weight_decay:     a.weight_decay,
            plateau_factor:   a.plateau_factor,
            plateau_patience: a.plateau_patience,
            stop_lr:          a.stop_lr,
            max_epochs:       a.max_epochs,
            d_model:          a.d_model,
            num_heads:        a.num_heads,
            num_layers:       a.num_layers,
            d_ff:             a.d_ff,
            d_hidden:         a.d_hidden,
            dropout:          a.dropout,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Labelled pairs to score
    #[arg(long)]
    pub data: String,

    /// Directory where training saved its checkpoint
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Override the embedding file recorded at training time
    #[arg(long)]
    pub embeddings: Option<String>,

    /// Override the device recorded at training time
    #[arg(long, value_enum)]
    pub device: Option<DeviceKind>,
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long)]
    pub premise: String,

    #[arg(long)]
    pub hypothesis: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Override the embedding file recorded at training time
    #[arg(long)]
    pub embeddings: Option<String>,

    /// Override the device recorded at training time
    #[arg(long, value_enum)]
    pub device: Option<DeviceKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["nli-trainer", "train", "--embeddings", "e.txt"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let d = TrainConfig::default();

        assert_eq!(cfg.embedding_file, "e.txt");
        assert_eq!(cfg.max_len, d.max_len);
        assert_eq!(cfg.batch_size, d.batch_size);
        assert_eq!(cfg.lr, d.lr);
        assert_eq!(cfg.weight_decay, d.weight_decay);
        assert_eq!(cfg.plateau_factor, d.plateau_factor);
        assert_eq!(cfg.stop_lr, d.stop_lr);
        assert_eq!(cfg.label_names, d.label_names);
        assert_eq!(cfg.dev_file, None);
        assert_eq!(cfg.max_epochs, None);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "nli-trainer", "train",
            "--embeddings", "e.txt",
            "--dev", "dev.txt",
            "--device", "cpu",
            "--unknown-words", "pad",
            "--labels", "yes,no",
            "--num-classes", "2",
            "--max-epochs", "5",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();

        assert_eq!(cfg.dev_file.as_deref(), Some("dev.txt"));
        assert_eq!(cfg.device, DeviceKind::Cpu);
        assert_eq!(cfg.unknown_words, UnknownWordPolicy::Pad);
        assert_eq!(cfg.label_names, vec!["yes", "no"]);
        assert_eq!(cfg.max_epochs, Some(5));
    }

    #[test]
    fn test_train_requires_embeddings() {
        assert!(Cli::try_parse_from(["nli-trainer", "train"]).is_err());
    }

    #[test]
    fn test_predict_args() {
        let cli = Cli::try_parse_from([
            "nli-trainer", "predict", "--premise", "a b", "--hypothesis", "c",
        ])
        .unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.premise, "a b");
        assert_eq!(args.checkpoint_dir, "checkpoints");
        assert_eq!(args.device, None);
    }
}
