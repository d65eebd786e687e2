// ============================================================
// Layer 3 — Blend Record Domain Type
// ============================================================
// One on-disk training sample for the blend-weight pipeline.
// The JSON layout is fixed by the data generator: two series of
// equal length and the three mixing weights that produced them.

use serde::{Deserialize, Serialize};

/// Number of blend weights predicted per sample.
pub const WEIGHT_COUNT: usize = 3;

/// A decoded blend sample. `value` and `trend` are stacked into
/// the two input channels of the conv model; `weights` is the
/// regression target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendRecord {
    pub value:   Vec<f64>,
    pub trend:   Vec<f64>,
    pub weights: Vec<f64>,
}
