// ============================================================
// Layer 4 — Datasets
// ============================================================
// Two Dataset implementations, one per pipeline.
//
// BlendFileDataset decodes one JSON file per index access, so
// the loader's worker threads parallelise file decoding ahead of
// each training step. SeriesDataset holds its twenty pairs in
// memory; the files are read once, up front, by the loader.

use burn::data::dataset::Dataset;
use std::{fs, path::PathBuf};

use crate::domain::blend::BlendRecord;
use crate::domain::series::SeriesPair;

// ─── BlendFileDataset ─────────────────────────────────────────────────────────
/// Fixed-size indexable collection over blend sample files.
pub struct BlendFileDataset {
    files: Vec<PathBuf>,
}

impl BlendFileDataset {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }
}

impl Dataset<BlendRecord> for BlendFileDataset {
    /// Decode the sample behind `index`.
    ///
    /// No validation is performed on the decoded arrays. A file
    /// that is unreadable or missing a key aborts the run here;
    /// a length mismatch aborts later, at batch assembly. Both
    /// are deliberate: one bad sample fails the whole run.
    fn get(&self, index: usize) -> Option<BlendRecord> {
        let path = self.files.get(index)?;
        let json = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("unreadable sample '{}': {e}", path.display()));
        let record: BlendRecord = serde_json::from_str(&json)
            .unwrap_or_else(|e| panic!("malformed sample '{}': {e}", path.display()));
        Some(record)
    }

    fn len(&self) -> usize {
        self.files.len()
    }
}

// ─── SeriesDataset ────────────────────────────────────────────────────────────
/// In-memory dataset over value/trend pairs for the fine-tune
/// pipeline.
pub struct SeriesDataset {
    pairs: Vec<SeriesPair>,
}

impl SeriesDataset {
    pub fn new(pairs: Vec<SeriesPair>) -> Self {
        Self { pairs }
    }
}

impl Dataset<SeriesPair> for SeriesDataset {
    fn get(&self, index: usize) -> Option<SeriesPair> {
        self.pairs.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_dataset_decodes_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample0.json");
        fs::write(
            &path,
            r#"{"value": [1.0, 2.0], "trend": [0.5, 0.5], "weights": [0.2, 0.3, 0.5]}"#,
        )
        .unwrap();

        let dataset = BlendFileDataset::new(vec![path]);
        assert_eq!(dataset.len(), 1);

        let record = dataset.get(0).unwrap();
        assert_eq!(record.value, vec![1.0, 2.0]);
        assert_eq!(record.weights, vec![0.2, 0.3, 0.5]);
        assert!(dataset.get(1).is_none());
    }

    #[test]
    #[should_panic(expected = "malformed sample")]
    fn test_blend_dataset_panics_on_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"value": [1.0]}"#).unwrap();

        BlendFileDataset::new(vec![path]).get(0);
    }

    #[test]
    fn test_series_dataset_is_positional() {
        let pairs = vec![
            SeriesPair::new(vec![1.0], vec![2.0]),
            SeriesPair::new(vec![3.0], vec![4.0]),
        ];
        let dataset = SeriesDataset::new(pairs);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1).unwrap().value, vec![3.0]);
    }
}
