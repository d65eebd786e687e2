// ============================================================
// Layer 4 — Input Loaders
// ============================================================
// Three on-disk formats feed the two pipelines:
//
//   - blend samples:   one JSON object per file in a flat folder
//                      (decoded lazily by BlendFileDataset)
//   - benchmark series: one CSV per catalog token with a `value`
//                      column, paired with the per-user trend JSON
//   - trend references: one JSON per catalog token with the
//                      baseline trends (value, l1norm, hp, stl)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::catalog;
use crate::domain::series::{SeriesPair, TrendReference};
use crate::domain::traits::SampleSource;

// ─── BlendFolder ──────────────────────────────────────────────────────────────
/// Enumerates blend sample files from a flat directory.
/// Every regular file counts as one sample; decoding happens
/// later, per index access, in BlendFileDataset.
pub struct BlendFolder {
    dir: PathBuf,
}

impl BlendFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SampleSource for BlendFolder {
    fn list_samples(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read sample folder '{}'", self.dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        tracing::info!("Found {} sample files in '{}'", files.len(), self.dir.display());
        Ok(files)
    }
}

// ─── Benchmark series ─────────────────────────────────────────────────────────
/// One row of a benchmark series CSV. Extra columns (timestamps,
/// anomaly labels) are ignored by serde.
#[derive(Debug, Deserialize)]
struct ValueRow {
    value: f64,
}

/// Read the `value` column of the series CSV for one catalog token.
/// The CSV path is `{prefix}{token}.csv`, mirroring the benchmark
/// folder layout.
pub fn load_series_values(series_prefix: &str, token: &str) -> Result<Vec<f64>> {
    let path = format!("{series_prefix}{token}.csv");
    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("Cannot open series CSV '{path}'"))?;

    let mut values = Vec::new();
    for row in reader.deserialize() {
        let row: ValueRow = row.with_context(|| format!("Malformed row in '{path}'"))?;
        values.push(row.value);
    }
    Ok(values)
}

/// The per-user trend JSON: `trend` holds one target trend per
/// catalog index, in catalog order.
#[derive(Debug, Deserialize)]
struct UserTrendFile {
    trend: Vec<Vec<f64>>,
}

/// Load the per-user target trends, one per catalog index.
pub fn load_user_trends(path: &Path) -> Result<Vec<Vec<f64>>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read user trend file '{}'", path.display()))?;
    let file: UserTrendFile = serde_json::from_str(&json)
        .with_context(|| format!("Malformed user trend file '{}'", path.display()))?;
    Ok(file.trend)
}

/// Assemble SeriesPairs for a range of catalog indices: the CSV
/// value series as input, the user trend for the same index as
/// target.
pub fn load_series_set(
    series_prefix: &str,
    trends:        &[Vec<f64>],
    indices:       std::ops::Range<usize>,
) -> Result<Vec<SeriesPair>> {
    let mut pairs = Vec::with_capacity(indices.len());
    for index in indices {
        let token = catalog::series_token(index)
            .with_context(|| format!("Catalog index {index} out of range"))?;
        let value = load_series_values(series_prefix, token)?;
        let trend = trends
            .get(index)
            .with_context(|| format!("User trend file has no entry for index {index}"))?
            .clone();
        pairs.push(SeriesPair::new(value, trend));
    }
    Ok(pairs)
}

// ─── Trend references ─────────────────────────────────────────────────────────
/// Load the baseline trends for one catalog token from the
/// trend-reference folder (`{dir}/{token}.json`).
pub fn load_trend_reference(dir: &Path, token: &str) -> Result<TrendReference> {
    let path = dir.join(format!("{token}.json"));
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read trend reference '{}'", path.display()))?;
    let reference: TrendReference = serde_json::from_str(&json)
        .with_context(|| format!("Malformed trend reference '{}'", path.display()))?;
    Ok(reference)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_blend_folder_lists_every_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.json", "c.json"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let files = BlendFolder::new(dir.path()).list_samples().unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_series_csv_reads_value_column() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/TS", dir.path().display());
        let mut f = fs::File::create(format!("{prefix}7.csv")).unwrap();
        writeln!(f, "timestamp,value,anomaly").unwrap();
        writeln!(f, "1,0.5,0").unwrap();
        writeln!(f, "2,1.5,0").unwrap();

        let values = load_series_values(&prefix, "7").unwrap();
        assert_eq!(values, vec![0.5, 1.5]);
    }

    #[test]
    fn test_user_trends_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user29.json");
        fs::write(&path, r#"{"trend": [[1.0, 2.0], [3.0, 4.0]]}"#).unwrap();

        let trends = load_user_trends(&path).unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[1], vec![3.0, 4.0]);
    }

    #[test]
    fn test_trend_reference_decodes_all_baselines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("4.json"),
            r#"{"value": [1.0], "l1norm": [2.0], "hp": [3.0], "stl": [4.0]}"#,
        )
        .unwrap();

        let reference = load_trend_reference(dir.path(), "4").unwrap();
        assert_eq!(reference.l1norm, vec![2.0]);
        assert_eq!(reference.stl, vec![4.0]);
    }
}
