// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parsing is delegated to
// clap; all work is delegated to Layer 2. This layer only
// routes, converts arguments, and picks the compute backend.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, FinetuneArgs, TrainBlendArgs};

use crate::ml::{default_device, DefaultBackend};

#[derive(Parser, Debug)]
#[command(
    name = "trendmix",
    version = "0.1.0",
    about = "Train a blend-weight conv model and fine-tune a trend-simulating transformer."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::TrainBlend(args) => Self::run_train_blend(args),
            Commands::Finetune(args) => Self::run_finetune(args),
        }
    }

    fn run_train_blend(args: TrainBlendArgs) -> Result<()> {
        use crate::application::blend_use_case::BlendUseCase;

        tracing::info!("Starting blend training on samples in: {}", args.data_dir);

        let use_case = BlendUseCase::new(args.into());
        use_case.execute::<DefaultBackend>(default_device())?;

        println!("Blend training complete.");
        Ok(())
    }

    fn run_finetune(args: FinetuneArgs) -> Result<()> {
        use crate::application::finetune_use_case::FinetuneUseCase;

        tracing::info!("Fine-tuning pretrained transformer for user {}", args.user);

        let use_case = FinetuneUseCase::new(args.into());
        use_case.execute::<DefaultBackend>(default_device())?;

        println!("Fine-tune run complete.");
        Ok(())
    }
}
