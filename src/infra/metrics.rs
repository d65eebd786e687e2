// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two concerns share this module: the per-epoch CSV log written
// during blend training (one row per epoch, loadable into any
// spreadsheet for learning-curve analysis), and the error
// statistics used by the fine-tune report (SMAPE, MSE, mean,
// sample standard deviation, and the old/new-environment split).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

// ─── Epoch metrics CSV ────────────────────────────────────────────────────────
/// One row of metrics data for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:     usize,
    pub train_mse: f64,
    pub train_mae: f64,
    pub valid_mse: f64,
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger for `file_name` under `dir`, writing the
    /// header if the file does not exist yet.
    pub fn new(dir: &Path, file_name: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let csv_path = dir.join(file_name);

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_mse,train_mae,valid_mse")?;
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_mse, m.train_mae, m.valid_mse,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Error statistics ─────────────────────────────────────────────────────────
/// Symmetric mean absolute percentage error:
/// mean over elements of 2·|a−b| / (|a|+|b|). Bounded in [0, 2]
/// per element; an all-zero element pair yields NaN, as in the
/// reference results.
pub fn smape(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::NAN;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| 2.0 * (x - y).abs() / (x.abs() + y.abs()))
        .sum();
    sum / n as f64
}

/// Mean squared error over two equally long slices.
pub fn mse(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::NAN;
    }
    let sum: f64 = a.iter().zip(b).map(|(&x, &y)| (x - y) * (x - y)).sum();
    sum / n as f64
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (Bessel-corrected, divisor n−1).
/// NaN for fewer than two values, matching numpy's ddof=1.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

// ─── Regime summary ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy)]
pub struct GroupStats {
    pub mean: f64,
    pub std:  f64,
}

impl GroupStats {
    fn from(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std:  sample_std(values),
        }
    }
}

/// Held-out errors split positionally: the first `old_count`
/// samples belong to the old environment, the remainder to the
/// new one. The split relies on the catalog's held-out ordering.
pub struct RegimeSummary {
    pub old_mse:   GroupStats,
    pub new_mse:   GroupStats,
    pub old_smape: GroupStats,
    pub new_smape: GroupStats,
}

impl RegimeSummary {
    pub fn new(mse_errors: &[f64], smape_errors: &[f64], old_count: usize) -> Self {
        let split = old_count.min(mse_errors.len());
        Self {
            old_mse:   GroupStats::from(&mse_errors[..split]),
            new_mse:   GroupStats::from(&mse_errors[split..]),
            old_smape: GroupStats::from(&smape_errors[..split]),
            new_smape: GroupStats::from(&smape_errors[split..]),
        }
    }

    /// Print the per-group mean ± sample-std lines to stdout.
    pub fn print(&self, user: &str) {
        println!("## pretrained transformer");
        println!("User: {user}");
        println!("* Old env MSE mean: {:.2} ± {:.2}", self.old_mse.mean, self.old_mse.std);
        println!("* New env MSE mean: {:.2} ± {:.2}", self.new_mse.mean, self.new_mse.std);
        println!("* Old env SMAPE mean: {:.2} ± {:.2}", self.old_smape.mean, self.old_smape.std);
        println!("* New env SMAPE mean: {:.2} ± {:.2}", self.new_smape.mean, self.new_smape.std);
    }
}
