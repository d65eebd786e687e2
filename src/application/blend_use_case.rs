// ============================================================
// Layer 2 — Blend Training Use Case
// ============================================================
// Orchestrates the blend pipeline end to end, repeated over
// several independent runs:
//
//   Step 1: Enumerate sample files        (Layer 4 - data)
//   Step 2: Draw a fresh validation split (Layer 4 - data)
//   Step 3: Build the lazy datasets       (Layer 4 - data)
//   Step 4: Run the training loop         (Layer 5 - ml)
//   Step 5: Log metrics, save best model,
//           render the loss curve         (Layer 6 - infra)
//
// Each run draws its own random split, so the collected
// best-epoch indices form a small distribution rather than a
// single point — that distribution is the experiment's headline
// output, written to the summary file at the end.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use burn::tensor::backend::AutodiffBackend;

use crate::data::{dataset::BlendFileDataset, loader::BlendFolder, splitter::split_validation};
use crate::domain::series::SERIES_LEN;
use crate::domain::traits::SampleSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    plot::{self, Series},
};
use crate::ml::trainer::train_blend;

// ─── Configuration ────────────────────────────────────────────────────────────
/// All hyperparameters and paths of one blend experiment.
/// Serialisable so the exact settings of a run are persisted
/// next to its checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendTrainConfig {
    pub data_dir:     String,
    pub out_dir:      String,
    pub epochs:       usize,
    pub batch_size:   usize,
    pub lr:           f64,
    pub runs:         usize,
    pub val_fraction: f64,
    pub series_len:   usize,
    pub workers:      usize,
}

impl Default for BlendTrainConfig {
    fn default() -> Self {
        Self {
            data_dir:     "mixer_multiple_full".to_string(),
            out_dir:      "artifacts".to_string(),
            epochs:       200,
            batch_size:   200,
            lr:           0.005,
            runs:         5,
            val_fraction: 0.2,
            series_len:   SERIES_LEN,
            workers:      8,
        }
    }
}

// ─── BlendUseCase ─────────────────────────────────────────────────────────────
pub struct BlendUseCase {
    config: BlendTrainConfig,
}

impl BlendUseCase {
    pub fn new(config: BlendTrainConfig) -> Self {
        Self { config }
    }

    /// Execute all repeat runs on the given device.
    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<()> {
        let cfg = &self.config;
        let out_dir = Path::new(&cfg.out_dir);

        let ckpt_manager = CheckpointManager::new(out_dir);
        ckpt_manager.save_config(cfg, "blend_train_config")?;

        let source = BlendFolder::new(&cfg.data_dir);

        let mut best_epochs = Vec::with_capacity(cfg.runs);
        let mut best_losses = Vec::with_capacity(cfg.runs);

        for run in 0..cfg.runs {
            tracing::info!("Starting run {}/{}", run + 1, cfg.runs);

            // ── Fresh split per run ───────────────────────────────────────────
            let files = source.list_samples()?;
            let (train_files, valid_files) = split_validation(files, cfg.val_fraction);
            tracing::info!(
                "Run {run}: {} training samples, {} validation samples",
                train_files.len(),
                valid_files.len(),
            );

            let train_dataset = BlendFileDataset::new(train_files);
            let valid_dataset = BlendFileDataset::new(valid_files);

            // ── Training loop ─────────────────────────────────────────────────
            let outcome =
                train_blend::<B>(cfg, device.clone(), train_dataset, valid_dataset)?;

            tracing::info!(
                "Run {run}: best validation loss {:.6} at epoch {}",
                outcome.best_loss,
                outcome.best_epoch,
            );

            // ── Metrics CSV ───────────────────────────────────────────────────
            let logger = MetricsLogger::new(out_dir, &format!("blend_metrics_{run}.csv"))?;
            for epoch in 0..outcome.history.train_mse.len() {
                logger.log(&EpochMetrics {
                    epoch,
                    train_mse: outcome.history.train_mse[epoch],
                    train_mae: outcome.history.train_mae[epoch],
                    valid_mse: outcome.history.valid_mse[epoch],
                })?;
            }

            // ── Best model, best-effort ───────────────────────────────────────
            // A failed save must not abort the remaining runs.
            match ckpt_manager.save_model(&outcome.model, &format!("blend_best_{run}")) {
                Ok(path) => tracing::info!("Run {run}: best model saved to '{}'", path.display()),
                Err(e) => tracing::error!("Run {run}: failed to save best model: {e:#}"),
            }

            // ── Loss curve ────────────────────────────────────────────────────
            let plot_path = out_dir.join(format!("blend_loss_{run}.svg"));
            let curves = [
                Series::new("Train", "steelblue", &outcome.history.train_mse),
                Series::new("Validation", "darkorange", &outcome.history.valid_mse),
            ];
            if let Err(e) = plot::line_chart(&plot_path, "Blend training MSE", &curves) {
                tracing::warn!("Run {run}: could not render loss curve: {e:#}");
            }

            best_epochs.push(outcome.best_epoch);
            best_losses.push(outcome.best_loss);
        }

        // ── Summary ───────────────────────────────────────────────────────────
        let summary = format!(
            "best model epoch per run: {best_epochs:?}\nbest validation loss per run: {best_losses:?}\n",
        );
        fs::write(out_dir.join("blend_summary.txt"), &summary)?;
        tracing::info!("{}", summary.trim_end());

        Ok(())
    }
}
