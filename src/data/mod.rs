// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw files to GPU-ready tensor batches.
//
// Blend pipeline:
//
//   sample folder (one JSON per sample)
//       │
//       ▼
//   BlendFolder         → enumerates the sample files
//       │
//       ▼
//   split_validation    → random 20% held out per run
//       │
//       ▼
//   BlendFileDataset    → decodes one file per index access
//       │
//       ▼
//   BlendBatcher        → stacks samples into [N, 2, L] tensors
//
// Fine-tune pipeline:
//
//   series CSVs + per-user trend JSON
//       │
//       ▼
//   catalog             → fixed index → filename-token table
//       │
//       ▼
//   load_series_split   → eager decode into SeriesPair vectors
//       │
//       ▼
//   SeriesDataset       → in-memory Dataset over the pairs
//       │
//       ▼
//   SeriesBatcher       → [N, 1, L] input/target tensor pairs

/// Enumerates and decodes the on-disk inputs of both pipelines
pub mod loader;

/// The fixed, order-sensitive benchmark series catalog
pub mod catalog;

/// Implements Burn's Dataset trait for both pipelines
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Draws the random validation subset for the blend pipeline
pub mod splitter;
