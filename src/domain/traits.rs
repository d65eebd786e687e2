// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to sample sources through this
// trait, not through concrete loaders, so a loader backed by a
// different on-disk layout can be swapped in without touching
// the training code.

use anyhow::Result;
use std::path::PathBuf;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can enumerate the sample files of a dataset.
///
/// Implementations:
///   - BlendFolder → every file in a flat directory, one sample each
pub trait SampleSource {
    /// List every sample file available from this source.
    fn list_samples(&self) -> Result<Vec<PathBuf>>;
}
