// ============================================================
// Layer 5 — Blend Training Loop
// ============================================================
// One full train + validation run over a random split, using
// Burn's DataLoader and Adam.
//
// Loop contract:
//   - fixed epoch count, no early stopping
//   - per-epoch loss is the mean of per-batch losses (sum over
//     batches ÷ batch count, not sample count — kept for parity
//     with the results this harness is compared against)
//   - best checkpoint: strict improvement on validation loss
//     only, snapshotting the parameters at improvement time
//   - training uses the autodiff backend; validation runs on the
//     inner backend via model.valid(), so no gradient state is
//     ever built for it

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::blend_use_case::BlendTrainConfig;
use crate::data::{batcher::BlendBatcher, dataset::BlendFileDataset};
use crate::ml::conv_model::{BlendConvNet, BlendConvNetConfig};

// ─── BestEpoch ────────────────────────────────────────────────────────────────
/// Tracks the lowest validation loss seen so far and the model
/// snapshot that produced it. Burn parameter tensors are
/// immutable, so cloning the model at improvement time is a true
/// point-in-time snapshot, not a live reference.
pub struct BestEpoch<M> {
    pub model: M,
    pub epoch: usize,
    pub loss:  f64,
}

impl<M: Clone> BestEpoch<M> {
    pub fn new(initial: &M) -> Self {
        Self {
            model: initial.clone(),
            epoch: 0,
            loss:  f64::MAX,
        }
    }

    /// Record this epoch if its loss strictly improves on the
    /// best seen. Equal losses do not update.
    pub fn observe(&mut self, epoch: usize, loss: f64, model: &M) -> bool {
        if loss < self.loss {
            self.loss = loss;
            self.epoch = epoch;
            self.model = model.clone();
            true
        } else {
            false
        }
    }
}

// ─── Run history & outcome ────────────────────────────────────────────────────
/// Per-epoch loss curves for one run, kept for plotting.
#[derive(Debug, Default, Clone)]
pub struct RunHistory {
    pub train_mse: Vec<f64>,
    pub train_mae: Vec<f64>,
    pub valid_mse: Vec<f64>,
}

pub struct BlendRunOutcome<B: AutodiffBackend> {
    pub model:      BlendConvNet<B>,
    pub best_epoch: usize,
    pub best_loss:  f64,
    pub history:    RunHistory,
}

// ─── Training loop ────────────────────────────────────────────────────────────
pub fn train_blend<B: AutodiffBackend>(
    cfg:           &BlendTrainConfig,
    device:        B::Device,
    train_dataset: BlendFileDataset,
    valid_dataset: BlendFileDataset,
) -> Result<BlendRunOutcome<B>> {
    let mut model: BlendConvNet<B> = BlendConvNetConfig::new()
        .with_series_len(cfg.series_len)
        .init(&device);
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let train_batcher = BlendBatcher::<B>::new(device.clone());
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(cfg.workers)
        .build(train_dataset);

    let valid_batcher = BlendBatcher::<B::InnerBackend>::new(device.clone());
    let valid_loader = DataLoaderBuilder::new(valid_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(cfg.workers)
        .build(valid_dataset);

    let mut best = BestEpoch::new(&model);
    let mut history = RunHistory::default();

    for epoch in 0..cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut mse_sum = 0.0f64;
        let mut mae_sum = 0.0f64;
        let mut batches = 0usize;

        for batch in train_loader.iter() {
            let (mse, mae) = model.forward_loss(batch.inputs, batch.targets);

            mse_sum += mse.clone().into_scalar().elem::<f64>();
            mae_sum += mae.into_scalar().elem::<f64>();
            batches += 1;

            let grads = GradientsParams::from_grads(mse.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_mse = if batches > 0 { mse_sum / batches as f64 } else { f64::NAN };
        let train_mae = if batches > 0 { mae_sum / batches as f64 } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_sum = 0.0f64;
        let mut val_batches = 0usize;

        for batch in valid_loader.iter() {
            let (mse, _mae) = model_valid.forward_loss(batch.inputs, batch.targets);
            val_sum += mse.into_scalar().elem::<f64>();
            val_batches += 1;
        }

        let valid_mse = if val_batches > 0 { val_sum / val_batches as f64 } else { f64::NAN };

        if best.observe(epoch, valid_mse, &model) {
            tracing::debug!("New best validation loss {:.6} at epoch {}", valid_mse, epoch);
        }

        history.train_mse.push(train_mse);
        history.train_mae.push(train_mae);
        history.valid_mse.push(valid_mse);

        println!(
            "Epoch {:>3}/{} | train_mse={:.6} | train_mae={:.6} | val_mse={:.6}",
            epoch + 1,
            cfg.epochs,
            train_mse,
            train_mae,
            valid_mse,
        );
    }

    Ok(BlendRunOutcome {
        model:      best.model,
        best_epoch: best.epoch,
        best_loss:  best.loss,
        history,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    type TestAutodiff = burn::backend::Autodiff<burn::backend::NdArray>;

    #[test]
    fn test_best_epoch_tracks_strict_minimum() {
        let mut best = BestEpoch::new(&());
        for (epoch, loss) in [5.0, 3.0, 4.0, 2.0, 6.0].into_iter().enumerate() {
            best.observe(epoch, loss, &());
        }
        assert_eq!(best.epoch, 3);
        assert_eq!(best.loss, 2.0);
    }

    #[test]
    fn test_equal_loss_does_not_update() {
        let mut best = BestEpoch::new(&());
        assert!(best.observe(0, 2.0, &()));
        assert!(!best.observe(1, 2.0, &()));
        assert_eq!(best.epoch, 0);
    }

    fn write_synthetic_samples(dir: &std::path::Path, count: usize, len: usize) -> Vec<std::path::PathBuf> {
        (0..count)
            .map(|i| {
                let value: Vec<f64> = (0..len).map(|j| ((i + j) % 5) as f64 * 0.1).collect();
                let trend: Vec<f64> = (0..len).map(|j| (j % 3) as f64 * 0.2).collect();
                let json = serde_json::json!({
                    "value": value,
                    "trend": trend,
                    "weights": [0.2, 0.3, 0.5],
                });
                let path = dir.join(format!("sample{i}.json"));
                fs::write(&path, json.to_string()).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_two_epoch_run_on_synthetic_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_synthetic_samples(dir.path(), 10, 16);

        let cfg = BlendTrainConfig {
            epochs:     2,
            batch_size: 5,
            lr:         1e-3,
            series_len: 16,
            workers:    1,
            ..Default::default()
        };

        let train = BlendFileDataset::new(files[..8].to_vec());
        let valid = BlendFileDataset::new(files[8..].to_vec());

        let outcome =
            train_blend::<TestAutodiff>(&cfg, Default::default(), train, valid).unwrap();

        assert_eq!(outcome.history.train_mse.len(), 2);
        assert_eq!(outcome.history.valid_mse.len(), 2);
        for loss in outcome
            .history
            .train_mse
            .iter()
            .chain(outcome.history.valid_mse.iter())
        {
            assert!(loss.is_finite());
        }

        // The recorded best must be the minimum of the validation curve.
        let (argmin, min) = outcome
            .history
            .valid_mse
            .iter()
            .enumerate()
            .fold((0, f64::MAX), |acc, (i, &l)| if l < acc.1 { (i, l) } else { acc });
        assert_eq!(outcome.best_epoch, argmin);
        assert!((outcome.best_loss - min).abs() < 1e-12);
    }
}
