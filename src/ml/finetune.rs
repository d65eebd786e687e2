// ============================================================
// Layer 5 — Fine-Tune Loop & Held-Out Evaluation
// ============================================================
// Training half: the pretrained transformer arrives with its
// backbone already frozen, so each optimizer step only touches
// the dense head. There is no validation phase here — the run
// trains for a fixed epoch count, then evaluates once on the
// held-out series.
//
// Evaluation half: gradient-free forward passes on the inner
// backend, collecting per-sample error metrics and the raw
// series needed for the diagnostic plots. The decoder is fed the
// target trend, exactly as during training.

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::finetune_use_case::FinetuneConfig;
use crate::data::{batcher::SeriesBatcher, dataset::SeriesDataset};
use crate::infra::metrics::{mse, smape};
use crate::ml::transformer::TrendTransformer;

pub struct FinetuneOutcome<B: AutodiffBackend> {
    pub model:      TrendTransformer<B>,
    pub train_loss: Vec<f64>,
}

/// Train the dense head for a fixed number of epochs.
pub fn train_head<B: AutodiffBackend>(
    cfg:       &FinetuneConfig,
    device:    B::Device,
    mut model: TrendTransformer<B>,
    dataset:   SeriesDataset,
) -> Result<FinetuneOutcome<B>> {
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let batcher = SeriesBatcher::<B>::new(device);
    let loader = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .num_workers(cfg.workers)
        .build(dataset);

    let mut train_loss = Vec::with_capacity(cfg.epochs);

    for epoch in 0..cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches = 0usize;

        for batch in loader.iter() {
            let loss = model.forward_loss(batch.inputs, batch.targets);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let epoch_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        train_loss.push(epoch_loss);
        println!("Epoch {:>3}/{} | train_mse={:.6}", epoch + 1, cfg.epochs, epoch_loss);
    }

    Ok(FinetuneOutcome { model, train_loss })
}

// ─── Evaluation ───────────────────────────────────────────────────────────────
/// Everything the reporting layer needs about one held-out
/// sample, in dataset order.
pub struct SampleEval {
    pub input:     Vec<f64>,
    pub target:    Vec<f64>,
    pub simulated: Vec<f64>,
    pub mse:       f64,
    pub smape:     f64,
}

pub struct EvalReport {
    pub batch_loss: Vec<f64>,
    pub samples:    Vec<SampleEval>,
}

/// Run the held-out pass. `model` must already be on the
/// gradient-free inner backend (`outcome.model.valid()`).
///
/// The reporting splits errors by position, so samples must come
/// back in dataset order — hence a single loader worker here.
pub fn evaluate<B: Backend>(
    model:      &TrendTransformer<B>,
    device:     B::Device,
    dataset:    SeriesDataset,
    batch_size: usize,
) -> EvalReport {
    let batcher = SeriesBatcher::<B>::new(device);
    let loader = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let mut batch_loss = Vec::new();
    let mut samples = Vec::new();

    for batch in loader.iter() {
        let [count, _, series_len] = batch.inputs.dims();

        let simulated = model.forward(batch.inputs.clone(), batch.targets.clone());

        let loss = burn::nn::loss::MseLoss::new().forward(
            simulated.clone(),
            batch.targets.clone(),
            burn::nn::loss::Reduction::Mean,
        );
        batch_loss.push(loss.into_scalar().elem::<f64>());

        for i in 0..count {
            let row = |t: &Tensor<B, 3>| -> Vec<f64> {
                t.clone()
                    .slice([i..i + 1, 0..1, 0..series_len])
                    .reshape([series_len])
                    .into_data()
                    .to_vec::<f32>()
                    .unwrap()
                    .into_iter()
                    .map(f64::from)
                    .collect()
            };

            let input = row(&batch.inputs);
            let target = row(&batch.targets);
            let predicted = row(&simulated);

            samples.push(SampleEval {
                mse:       mse(&target, &predicted),
                smape:     smape(&target, &predicted),
                input,
                target,
                simulated: predicted,
            });
        }
    }

    EvalReport { batch_loss, samples }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::SeriesPair;
    use crate::ml::transformer::TrendTransformerConfig;

    type TestBackend = burn::backend::NdArray;
    type TestAutodiff = burn::backend::Autodiff<TestBackend>;

    fn toy_pairs(count: usize, len: usize) -> Vec<SeriesPair> {
        (0..count)
            .map(|i| {
                let value: Vec<f64> = (0..len).map(|j| ((i + j) % 4) as f64 * 0.5).collect();
                let trend: Vec<f64> = (0..len).map(|j| (j % 2) as f64).collect();
                SeriesPair::new(value, trend)
            })
            .collect()
    }

    fn toy_model<B: Backend>(device: &B::Device, len: usize) -> TrendTransformer<B> {
        TrendTransformerConfig::new()
            .with_d_model(len)
            .with_n_heads(2)
            .with_decoder_layers(1)
            .with_d_ff(16)
            .with_max_len(8)
            .init(device)
    }

    #[test]
    fn test_head_training_records_one_loss_per_epoch() {
        let device = Default::default();
        let model = toy_model::<TestAutodiff>(&device, 8).freeze_backbone();
        let dataset = SeriesDataset::new(toy_pairs(4, 8));

        let cfg = FinetuneConfig {
            epochs:     3,
            lr:         1e-3,
            batch_size: 2,
            workers:    1,
            ..Default::default()
        };

        let outcome = train_head(&cfg, device, model, dataset).unwrap();
        assert_eq!(outcome.train_loss.len(), 3);
        assert!(outcome.train_loss.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn test_evaluation_is_per_sample_and_ordered() {
        let device: <TestBackend as Backend>::Device = Default::default();
        let model = toy_model::<TestBackend>(&device, 8);
        let dataset = SeriesDataset::new(toy_pairs(5, 8));

        let report = evaluate(&model, device, dataset, 2);

        assert_eq!(report.samples.len(), 5);
        // Dataset order is preserved: sample 0 starts at value 0.0.
        assert_eq!(report.samples[0].input[0], 0.0);
        assert_eq!(report.samples[1].input[0], 0.5);
        for sample in &report.samples {
            assert_eq!(sample.simulated.len(), 8);
            assert!(sample.mse.is_finite());
            assert!(sample.smape.is_finite());
        }
    }
}
