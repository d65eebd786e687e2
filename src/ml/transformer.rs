// ============================================================
// Layer 5 — Trend-Simulating Transformer
// ============================================================
// A sinusoidal positional encoding feeding a standard
// encoder–decoder attention stack, closed by a dense projection
// back to the series width. A whole series is presented as one
// sequence position of model-width features, so the attention
// operates across the batch's single position — the capacity
// lives in the 1680-wide feature mixing.
//
// Fine-tuning contract: the positional encoder and the attention
// stack come from a pretrained checkpoint and are frozen; only
// the dense head keeps gradient tracking.

use burn::{
    nn::{
        transformer::{
            TransformerDecoder, TransformerDecoderConfig, TransformerDecoderInput,
            TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput,
        },
        Linear, LinearConfig,
    },
    prelude::*,
};

// ─── Sinusoidal table ─────────────────────────────────────────────────────────
/// Build the positional-encoding table in closed form, row-major
/// [max_len, d_model]:
///
///   table[p, 2i]   = sin(p / 10000^(2i/d_model))
///   table[p, 2i+1] = cos(p / 10000^(2i/d_model))
///
/// Computed in f64 and narrowed once at the end.
pub fn sinusoidal_table(d_model: usize, max_len: usize) -> Vec<f32> {
    let mut table = vec![0.0f32; max_len * d_model];
    for pos in 0..max_len {
        for even in (0..d_model).step_by(2) {
            let angle = pos as f64
                * (-(10000f64.ln()) * (even as f64) / (d_model as f64)).exp();
            table[pos * d_model + even] = angle.sin() as f32;
            if even + 1 < d_model {
                table[pos * d_model + even + 1] = angle.cos() as f32;
            }
        }
    }
    table
}

#[derive(Config, Debug)]
pub struct PositionalEncodingConfig {
    pub d_model: usize,
    #[config(default = 5000)]
    pub max_len: usize,
}

/// Additive positional signal, precomputed once. The table is a
/// constant tensor, not a parameter — nothing here trains.
#[derive(Module, Debug)]
pub struct PositionalEncoding<B: Backend> {
    encoding: Tensor<B, 2>,
}

impl PositionalEncodingConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PositionalEncoding<B> {
        let table = sinusoidal_table(self.d_model, self.max_len);
        let encoding = Tensor::<B, 1>::from_floats(table.as_slice(), device)
            .reshape([self.max_len, self.d_model]);
        PositionalEncoding { encoding }
    }
}

impl<B: Backend> PositionalEncoding<B> {
    /// input: [batch, seq_len, d_model] — adds rows [0, seq_len)
    /// of the table, broadcast over the batch.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let [_batch, seq_len, d_model] = input.dims();
        let positional = self
            .encoding
            .clone()
            .slice([0..seq_len, 0..d_model])
            .unsqueeze::<3>();
        input + positional
    }
}

// ─── TrendTransformer ─────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct TrendTransformerConfig {
    #[config(default = 1680)]
    pub d_model: usize,
    #[config(default = 5)]
    pub n_heads: usize,
    #[config(default = 1)]
    pub encoder_layers: usize,
    #[config(default = 6)]
    pub decoder_layers: usize,
    #[config(default = 2048)]
    pub d_ff: usize,
    #[config(default = 5000)]
    pub max_len: usize,
}

#[derive(Module, Debug)]
pub struct TrendTransformer<B: Backend> {
    pos:     PositionalEncoding<B>,
    encoder: TransformerEncoder<B>,
    decoder: TransformerDecoder<B>,
    head:    Linear<B>,
}

impl TrendTransformerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TrendTransformer<B> {
        let pos = PositionalEncodingConfig::new(self.d_model)
            .with_max_len(self.max_len)
            .init(device);
        let encoder =
            TransformerEncoderConfig::new(self.d_model, self.d_ff, self.n_heads, self.encoder_layers)
                .init(device);
        let decoder =
            TransformerDecoderConfig::new(self.d_model, self.d_ff, self.n_heads, self.decoder_layers)
                .init(device);
        let head = LinearConfig::new(self.d_model, self.d_model).init(device);

        TrendTransformer { pos, encoder, decoder, head }
    }
}

impl<B: Backend> TrendTransformer<B> {
    /// src, tgt: [batch, seq_len, d_model] → [batch, seq_len, d_model]
    pub fn forward(&self, src: Tensor<B, 3>, tgt: Tensor<B, 3>) -> Tensor<B, 3> {
        let src = self.pos.forward(src);
        let tgt = self.pos.forward(tgt);

        let memory = self.encoder.forward(TransformerEncoderInput::new(src));
        let out = self.decoder.forward(TransformerDecoderInput::new(tgt, memory));

        self.head.forward(out)
    }

    /// MSE of the simulated trend against the target.
    pub fn forward_loss(&self, src: Tensor<B, 3>, tgt: Tensor<B, 3>) -> Tensor<B, 1> {
        let output = self.forward(src, tgt.clone());
        burn::nn::loss::MseLoss::new().forward(output, tgt, burn::nn::loss::Reduction::Mean)
    }

    /// Disable gradient tracking on everything but the head.
    /// Call after loading a pretrained checkpoint; the optimizer
    /// then only ever sees gradients for the dense projection.
    pub fn freeze_backbone(self) -> Self {
        Self {
            pos:     self.pos.no_grad(),
            encoder: self.encoder.no_grad(),
            decoder: self.decoder.no_grad(),
            head:    self.head,
        }
    }
}
