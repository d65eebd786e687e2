// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific code lives in this layer: the two model
// architectures, the training loops, and the held-out
// evaluation. Other layers stay backend-free.
//
//   conv_model.rs  — BlendConvNet: Conv1d stack → dense → softmax
//   transformer.rs — PositionalEncoding + TrendTransformer
//   trainer.rs     — blend train/validation loop, best-epoch tracking
//   finetune.rs    — head-only fine-tune loop + held-out evaluation

/// Conv blend-weight regressor
pub mod conv_model;

/// Trend-simulating transformer and its positional encoding
pub mod transformer;

/// Blend training loop with validation and best-epoch tracking
pub mod trainer;

/// Fine-tune loop and held-out evaluation pass
pub mod finetune;

/// Default training backend: WGPU with autodiff. The training
/// entry points are generic over the backend; this alias is what
/// the CLI hands them.
pub type DefaultBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub fn default_device() -> burn::backend::wgpu::WgpuDevice {
    burn::backend::wgpu::WgpuDevice::default()
}
