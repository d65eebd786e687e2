// ============================================================
// Layer 4 — Batchers
// ============================================================
// Implements Burn's Batcher trait to convert sample vectors into
// device tensors. All series share a fixed length, so batching
// is flatten-then-reshape with no padding step.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::domain::blend::{BlendRecord, WEIGHT_COUNT};
use crate::domain::series::SeriesPair;

// ─── BlendBatch ───────────────────────────────────────────────────────────────
/// A batch of blend samples ready for the conv model.
#[derive(Debug, Clone)]
pub struct BlendBatch<B: Backend> {
    /// Stacked [value, trend] channels — shape: [batch, 2, series_len]
    pub inputs: Tensor<B, 3>,

    /// Blend-weight targets — shape: [batch, 3]
    pub targets: Tensor<B, 2>,
}

/// Holds the target device so tensors land on the right backend.
#[derive(Clone, Debug)]
pub struct BlendBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> BlendBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<BlendRecord, BlendBatch<B>> for BlendBatcher<B> {
    /// Stack N records into [N, 2, L] inputs and [N, 3] targets.
    /// The value channel comes first, then the trend channel,
    /// matching the conv model's input layout.
    fn batch(&self, items: Vec<BlendRecord>) -> BlendBatch<B> {
        let batch_size = items.len();
        let series_len = items[0].value.len();

        let input_flat: Vec<f32> = items
            .iter()
            .flat_map(|r| {
                r.value
                    .iter()
                    .chain(r.trend.iter())
                    .map(|&x| x as f32)
                    .collect::<Vec<f32>>()
            })
            .collect();

        let target_flat: Vec<f32> = items
            .iter()
            .flat_map(|r| r.weights.iter().map(|&x| x as f32))
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(input_flat.as_slice(), &self.device)
            .reshape([batch_size, 2, series_len]);

        let targets = Tensor::<B, 1>::from_floats(target_flat.as_slice(), &self.device)
            .reshape([batch_size, WEIGHT_COUNT]);

        BlendBatch { inputs, targets }
    }
}

// ─── SeriesBatch ──────────────────────────────────────────────────────────────
/// A batch of series pairs for the transformer: both sides are
/// reshaped to [batch, 1, series_len] — one sequence position of
/// model-width features per series.
#[derive(Debug, Clone)]
pub struct SeriesBatch<B: Backend> {
    pub inputs:  Tensor<B, 3>,
    pub targets: Tensor<B, 3>,
}

#[derive(Clone, Debug)]
pub struct SeriesBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SeriesBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SeriesPair, SeriesBatch<B>> for SeriesBatcher<B> {
    fn batch(&self, items: Vec<SeriesPair>) -> SeriesBatch<B> {
        let batch_size = items.len();
        let series_len = items[0].value.len();

        let value_flat: Vec<f32> = items
            .iter()
            .flat_map(|p| p.value.iter().map(|&x| x as f32))
            .collect();

        let trend_flat: Vec<f32> = items
            .iter()
            .flat_map(|p| p.trend.iter().map(|&x| x as f32))
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(value_flat.as_slice(), &self.device)
            .reshape([batch_size, 1, series_len]);

        let targets = Tensor::<B, 1>::from_floats(trend_flat.as_slice(), &self.device)
            .reshape([batch_size, 1, series_len]);

        SeriesBatch { inputs, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_blend_batch_shapes_and_channel_order() {
        let records = vec![
            BlendRecord {
                value:   vec![1.0, 2.0, 3.0],
                trend:   vec![4.0, 5.0, 6.0],
                weights: vec![0.1, 0.2, 0.7],
            },
            BlendRecord {
                value:   vec![7.0, 8.0, 9.0],
                trend:   vec![1.0, 1.0, 1.0],
                weights: vec![0.3, 0.3, 0.4],
            },
        ];

        let batcher = BlendBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(records);

        assert_eq!(batch.inputs.dims(), [2, 2, 3]);
        assert_eq!(batch.targets.dims(), [2, 3]);

        // Channel 0 of sample 0 is the value series.
        let flat: Vec<f32> = batch.inputs.into_data().to_vec().unwrap();
        assert_eq!(&flat[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&flat[3..6], &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_series_batch_reshapes_to_single_position() {
        let pairs = vec![SeriesPair::new(vec![1.0, 2.0], vec![3.0, 4.0])];

        let batcher = SeriesBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(pairs);

        assert_eq!(batch.inputs.dims(), [1, 1, 2]);
        assert_eq!(batch.targets.dims(), [1, 1, 2]);
    }
}
