// ============================================================
// Layer 3 — Series Domain Types
// ============================================================

use serde::{Deserialize, Serialize};

/// Length of every time series handled by both pipelines.
/// The conv stack and the transformer width are derived from it.
pub const SERIES_LEN: usize = 1680;

/// One value series paired with the trend the model should learn
/// to reproduce for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPair {
    /// The raw observed series
    pub value: Vec<f64>,

    /// The target trend for the same index range
    pub trend: Vec<f64>,
}

impl SeriesPair {
    pub fn new(value: Vec<f64>, trend: Vec<f64>) -> Self {
        Self { value, trend }
    }
}

/// Reference trends extracted by the baseline methods for one
/// benchmark series. Loaded from the trend-reference folder and
/// overlaid on the diagnostic plots when available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReference {
    pub value:  Vec<f64>,
    pub l1norm: Vec<f64>,
    pub hp:     Vec<f64>,
    pub stl:    Vec<f64>,
}
