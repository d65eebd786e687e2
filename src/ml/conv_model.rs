// ============================================================
// Layer 5 — Blend-Weight Conv Model
// ============================================================
// Four 1-D convolution stages over the stacked [value, trend]
// channels, a dense projection to the three blend weights,
// batch-norm over the outputs, and a softmax so the weights form
// a probability-like vector. Each kernel-3 valid convolution
// shrinks the sequence by two, so the flatten width is
// 64 × (series_len − 8).

use burn::{
    nn::{
        conv::{Conv1d, Conv1dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig1d,
    },
    prelude::*,
    tensor::activation::{relu, softmax},
};

use crate::domain::blend::WEIGHT_COUNT;

#[derive(Config, Debug)]
pub struct BlendConvNetConfig {
    /// Input series length per channel.
    #[config(default = 1680)]
    pub series_len: usize,
}

#[derive(Module, Debug)]
pub struct BlendConvNet<B: Backend> {
    conv1: Conv1d<B>,
    conv2: Conv1d<B>,
    conv3: Conv1d<B>,
    conv4: Conv1d<B>,
    fc:    Linear<B>,
    norm:  BatchNorm<B, 1>,
}

impl BlendConvNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> BlendConvNet<B> {
        let conv = |c_in, c_out| {
            Conv1dConfig::new(c_in, c_out, 3)
                .with_padding(PaddingConfig1d::Valid)
                .init(device)
        };

        // Four stages lose 2 positions each.
        let flat_width = 64 * (self.series_len - 8);

        BlendConvNet {
            conv1: conv(2, 16),
            conv2: conv(16, 32),
            conv3: conv(32, 32),
            conv4: conv(32, 64),
            fc:    LinearConfig::new(flat_width, WEIGHT_COUNT).init(device),
            norm:  BatchNormConfig::new(WEIGHT_COUNT).init(device),
        }
    }
}

impl<B: Backend> BlendConvNet<B> {
    /// input: [batch, 2, series_len] → weights: [batch, 3]
    /// Output rows sum to 1 (softmax postcondition).
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, _channels, _len] = input.dims();

        let x = relu(self.conv1.forward(input));
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x));
        let x = relu(self.conv4.forward(x));

        let x = x.flatten::<2>(1, 2);
        let x = self.fc.forward(x);

        // BatchNorm expects a spatial dim; give the 3 weights a
        // length-1 one and drop it again.
        let x = self
            .norm
            .forward(x.reshape([batch_size, WEIGHT_COUNT, 1]))
            .reshape([batch_size, WEIGHT_COUNT]);

        softmax(x, 1)
    }

    /// Forward pass plus the two tracked losses: MSE drives the
    /// optimizer, MAE is a secondary diagnostic.
    pub fn forward_loss(
        &self,
        input:   Tensor<B, 3>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let output = self.forward(input);

        let mse = burn::nn::loss::MseLoss::new().forward(
            output.clone(),
            targets.clone(),
            burn::nn::loss::Reduction::Mean,
        );
        let mae = (output - targets).abs().mean();

        (mse, mae)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn toy_input(batch: usize, len: usize) -> Tensor<TestBackend, 3> {
        let flat: Vec<f32> = (0..batch * 2 * len).map(|i| (i % 7) as f32 * 0.25).collect();
        Tensor::<TestBackend, 1>::from_floats(flat.as_slice(), &Default::default())
            .reshape([batch, 2, len])
    }

    #[test]
    fn test_output_shape() {
        let model = BlendConvNetConfig::new()
            .with_series_len(32)
            .init::<TestBackend>(&Default::default());
        let out = model.forward(toy_input(4, 32));
        assert_eq!(out.dims(), [4, 3]);
    }

    #[test]
    fn test_output_rows_sum_to_one() {
        let model = BlendConvNetConfig::new()
            .with_series_len(32)
            .init::<TestBackend>(&Default::default());
        let out = model.forward(toy_input(2, 32));

        let flat: Vec<f32> = out.into_data().to_vec().unwrap();
        for row in flat.chunks(3) {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "row sums to {sum}");
        }
    }

    #[test]
    fn test_losses_are_finite() {
        let model = BlendConvNetConfig::new()
            .with_series_len(32)
            .init::<TestBackend>(&Default::default());
        let targets = Tensor::<TestBackend, 1>::from_floats(
            [0.2, 0.3, 0.5, 0.1, 0.1, 0.8].as_slice(),
            &Default::default(),
        )
        .reshape([2, 3]);

        let (mse, mae) = model.forward_loss(toy_input(2, 32), targets);
        assert!(mse.into_scalar().is_finite());
        assert!(mae.into_scalar().is_finite());
    }
}
