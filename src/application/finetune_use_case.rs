// ============================================================
// Layer 2 — Fine-Tune Use Case
// ============================================================
// Orchestrates the fine-tune pipeline for one user:
//
//   Step 1: Load the user trends + benchmark series (Layer 4)
//   Step 2: Rebuild the transformer and load the
//           pretrained checkpoint                   (Layers 5/6)
//   Step 3: Freeze the backbone, train the head     (Layer 5)
//   Step 4: Held-out evaluation                     (Layer 5)
//   Step 5: Diagnostic plots + regime report        (Layer 6)
//
// Nothing is persisted beyond the plots and the stdout report —
// this is a fine-tune-and-report experiment, not a model
// production step.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use burn::module::AutodiffModule;
use burn::tensor::backend::AutodiffBackend;

use crate::data::{catalog, dataset::SeriesDataset, loader};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::RegimeSummary,
    plot::{self, Series},
};
use crate::ml::finetune::{evaluate, train_head};
use crate::ml::transformer::TrendTransformerConfig;

// ─── Configuration ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinetuneConfig {
    pub epochs:        usize,
    pub lr:            f64,
    pub batch_size:    usize,
    pub user:          String,
    pub series_prefix: String,
    pub model_dir:     String,
    pub model_name:    String,
    pub trend_dir:     Option<String>,
    pub img_dir:       Option<String>,
    pub workers:       usize,
}

impl FinetuneConfig {
    /// The per-user trend file follows the fixed convention
    /// `user<N>/user<N>.json`.
    pub fn user_file(&self) -> PathBuf {
        PathBuf::from(format!("user{0}/user{0}.json", self.user))
    }

    /// Where the diagnostic plots go; defaults to a per-user
    /// folder next to the working directory.
    pub fn image_dir(&self) -> PathBuf {
        match &self.img_dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(format!("simulated_user{}", self.user)),
        }
    }
}

impl Default for FinetuneConfig {
    fn default() -> Self {
        Self {
            epochs:        10,
            lr:            0.001,
            batch_size:    50,
            user:          "29".to_string(),
            series_prefix: "A4Benchmark/A4Benchmark-TS".to_string(),
            model_dir:     "checkpoints".to_string(),
            model_name:    "pretrained_transformer".to_string(),
            trend_dir:     None,
            img_dir:       None,
            workers:       8,
        }
    }
}

// ─── FinetuneUseCase ──────────────────────────────────────────────────────────
pub struct FinetuneUseCase {
    config: FinetuneConfig,
}

impl FinetuneUseCase {
    pub fn new(config: FinetuneConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: load inputs ───────────────────────────────────────────────
        let trends = loader::load_user_trends(&cfg.user_file())?;
        let train_pairs =
            loader::load_series_set(&cfg.series_prefix, &trends, catalog::train_indices())?;
        let test_pairs =
            loader::load_series_set(&cfg.series_prefix, &trends, catalog::test_indices())?;
        tracing::info!(
            "User {}: {} training series, {} held-out series",
            cfg.user,
            train_pairs.len(),
            test_pairs.len(),
        );

        // ── Step 2: pretrained model ──────────────────────────────────────────
        // The checkpoint directory may carry the architecture the
        // pretrained weights were produced with; fall back to the
        // standard configuration otherwise.
        let ckpt_manager = CheckpointManager::new(&cfg.model_dir);
        let model_cfg = match ckpt_manager
            .load_config::<TrendTransformerConfig>(&format!("{}_config", cfg.model_name))
        {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::debug!("No persisted model config ({e:#}); using defaults");
                TrendTransformerConfig::new()
            }
        };
        let model = model_cfg.init::<B>(&device);
        let model = ckpt_manager.load_model(model, &cfg.model_name, &device)?;

        // ── Step 3: freeze backbone, train the head ───────────────────────────
        let model = model.freeze_backbone();
        tracing::info!("Backbone frozen; training the dense head only");

        let outcome = train_head(cfg, device.clone(), model, SeriesDataset::new(train_pairs))?;

        let img_dir = cfg.image_dir();
        let loss_plot = img_dir.join("train_loss.svg");
        let curves = [Series::new("Train", "orange", &outcome.train_loss)];
        if let Err(e) = plot::line_chart(&loss_plot, "Fine-tune training MSE", &curves) {
            tracing::warn!("Could not render training-loss curve: {e:#}");
        }

        // ── Step 4: held-out evaluation ───────────────────────────────────────
        let eval_model = outcome.model.valid();
        let report = evaluate(
            &eval_model,
            device,
            SeriesDataset::new(test_pairs),
            cfg.batch_size,
        );
        tracing::info!(
            "Held-out loss over {} batches: {:.6}",
            report.batch_loss.len(),
            crate::infra::metrics::mean(&report.batch_loss),
        );

        // ── Step 5: diagnostics + regime report ───────────────────────────────
        for (i, sample) in report.samples.iter().enumerate() {
            let index = catalog::test_indices().start + i;
            let token = match catalog::series_token(index) {
                Some(token) => token,
                None => break,
            };

            let reference = cfg.trend_dir.as_ref().and_then(|dir| {
                match loader::load_trend_reference(Path::new(dir), token) {
                    Ok(reference) => Some(reference),
                    Err(e) => {
                        tracing::warn!("No trend reference for series {token}: {e:#}");
                        None
                    }
                }
            });

            let mut series = vec![
                Series::new("value", "mediumspringgreen", &sample.input),
                Series::new("simulated trend", "peru", &sample.simulated),
            ];
            if let Some(r) = &reference {
                series.push(Series::new("l1norm", "cornflowerblue", &r.l1norm));
                series.push(Series::new("hp", "lightsalmon", &r.hp));
                series.push(Series::new("stl", "silver", &r.stl));
            }

            let path = img_dir.join(token).join("pretrained_transformer.svg");
            if let Err(e) = plot::line_chart(&path, token, &series) {
                tracing::warn!("Could not render diagnostic plot for {token}: {e:#}");
            }
        }

        let mse_errors: Vec<f64> = report.samples.iter().map(|s| s.mse).collect();
        let smape_errors: Vec<f64> = report.samples.iter().map(|s| s.smape).collect();
        RegimeSummary::new(&mse_errors, &smape_errors, catalog::OLD_ENV_COUNT).print(&cfg.user);

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_file_convention() {
        let cfg = FinetuneConfig { user: "29".into(), ..Default::default() };
        assert_eq!(cfg.user_file(), PathBuf::from("user29/user29.json"));
    }

    #[test]
    fn test_image_dir_override() {
        let cfg = FinetuneConfig { img_dir: Some("plots".into()), ..Default::default() };
        assert_eq!(cfg.image_dir(), PathBuf::from("plots"));

        let cfg = FinetuneConfig { img_dir: None, user: "7".into(), ..Default::default() };
        assert_eq!(cfg.image_dir(), PathBuf::from("simulated_user7"));
    }
}
