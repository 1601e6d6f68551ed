// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to the application
// layer. This is the only layer that prints results.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, PredictArgs, TrainArgs};

use crate::application::{
    evaluate_use_case::EvaluateUseCase,
    predict_use_case::PredictUseCase,
    train_use_case::TrainUseCase,
};
use crate::domain::traits::PairClassifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{cpu_device, gpu_device, CpuBackend, DeviceKind, GpuBackend};

#[derive(Parser, Debug)]
#[command(
    name = "nli-trainer",
    version,
    about = "Train a sentence-pair NLI classifier on pretrained word embeddings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Training on '{}' with embeddings '{}'", args.train, args.embeddings);

    let checkpoint_dir = args.checkpoint_dir.clone();
    let outcome = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training finished after {} epochs. Best dev loss {:.3}, best dev acc {:.3}.",
        outcome.summary.epochs, outcome.summary.best_dev_loss, outcome.summary.best_dev_acc,
    );
    if let Some(test) = outcome.test {
        println!("Test Loss: {:.3}, Acc: {:.3}", test.avg_loss(), test.accuracy());
    }
    println!("Best checkpoint in '{checkpoint_dir}'.");
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let stats = EvaluateUseCase::new(args.checkpoint_dir, args.data.clone(), args.embeddings, args.device)
        .execute()?;
    println!(
        "{}: Loss: {:.3}, Acc: {:.3} ({} / {})",
        args.data,
        stats.avg_loss(),
        stats.accuracy(),
        stats.correct,
        stats.samples,
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let device = match args.device {
        Some(device) => device,
        None => CheckpointManager::new(&args.checkpoint_dir)?.load_config()?.device,
    };

    let prediction = match device {
        DeviceKind::Wgpu => PredictUseCase::<GpuBackend>::new(
            &args.checkpoint_dir,
            args.embeddings.as_deref(),
            gpu_device(),
        )?
        .classify(&args.premise, &args.hypothesis)?,
        DeviceKind::Cpu => PredictUseCase::<CpuBackend>::new(
            &args.checkpoint_dir,
            args.embeddings.as_deref(),
            cpu_device(),
        )?
        .classify(&args.premise, &args.hypothesis)?,
    };

    println!("\nLabel: {} ({:.1}%)", prediction.name, prediction.confidence() * 100.0);
    for (i, p) in prediction.probabilities.iter().enumerate() {
        println!("  [{i}] {:.4}", p);
    }
    Ok(())
}
