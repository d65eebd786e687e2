// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands, one per pipeline. The fine-tune flags keep
// the short names the experiment has always used (`--epoch`,
// `--batch`); the blend pipeline's former hardcoded constants
// are exposed as flags with those constants as defaults.

use clap::{Args, Subcommand};

use crate::application::blend_use_case::BlendTrainConfig;
use crate::application::finetune_use_case::FinetuneConfig;
use crate::domain::series::SERIES_LEN;

/// The two top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the blend-weight conv model over repeated random splits
    TrainBlend(TrainBlendArgs),

    /// Fine-tune the pretrained trend transformer for one user and report errors
    Finetune(FinetuneArgs),
}

/// Arguments for the `train-blend` command.
#[derive(Args, Debug)]
pub struct TrainBlendArgs {
    /// Folder with one JSON sample per file
    #[arg(long, default_value = "mixer_multiple_full")]
    pub data_dir: String,

    /// Where checkpoints, metrics, and plots are written
    #[arg(long, default_value = "artifacts")]
    pub out_dir: String,

    /// Number of full passes through the training data per run
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// Samples per mini-batch
    #[arg(long, default_value_t = 200)]
    pub batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.005)]
    pub lr: f64,

    /// Independent repeat runs, each with a fresh random split
    #[arg(long, default_value_t = 5)]
    pub runs: usize,

    /// Share of samples held out for validation each run
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Data-loader worker threads
    #[arg(long, default_value_t = 8)]
    pub workers: usize,
}

impl From<TrainBlendArgs> for BlendTrainConfig {
    fn from(a: TrainBlendArgs) -> Self {
        BlendTrainConfig {
            data_dir:     a.data_dir,
            out_dir:      a.out_dir,
            epochs:       a.epochs,
            batch_size:   a.batch_size,
            lr:           a.lr,
            runs:         a.runs,
            val_fraction: a.val_fraction,
            series_len:   SERIES_LEN,
            workers:      a.workers,
        }
    }
}

/// Arguments for the `finetune` command.
#[derive(Args, Debug)]
pub struct FinetuneArgs {
    /// Number of fine-tuning epochs
    #[arg(long = "epoch", default_value_t = 10)]
    pub epoch: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.001)]
    pub lr: f64,

    /// Samples per mini-batch
    #[arg(long = "batch", default_value_t = 50)]
    pub batch: usize,

    /// User whose trends to fine-tune on
    #[arg(long, default_value = "29")]
    pub user: String,

    /// Path prefix of the benchmark series CSVs
    #[arg(long, default_value = "A4Benchmark/A4Benchmark-TS")]
    pub series_prefix: String,

    /// Directory holding the pretrained checkpoint
    #[arg(long, default_value = "checkpoints")]
    pub model_dir: String,

    /// Checkpoint name of the pretrained transformer
    #[arg(long, default_value = "pretrained_transformer")]
    pub model_name: String,

    /// Optional trend-reference folder; when set, baseline trends
    /// are overlaid on the diagnostic plots
    #[arg(long)]
    pub trend_dir: Option<String>,

    /// Where the plots go (default: simulated_user<N>/)
    #[arg(long)]
    pub img_dir: Option<String>,

    /// Data-loader worker threads
    #[arg(long, default_value_t = 8)]
    pub workers: usize,
}

impl From<FinetuneArgs> for FinetuneConfig {
    fn from(a: FinetuneArgs) -> Self {
        FinetuneConfig {
            epochs:        a.epoch,
            lr:            a.lr,
            batch_size:    a.batch,
            user:          a.user,
            series_prefix: a.series_prefix,
            model_dir:     a.model_dir,
            model_name:    a.model_name,
            trend_dir:     a.trend_dir,
            img_dir:       a.img_dir,
            workers:       a.workers,
        }
    }
}
