// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights with Burn's CompactRecorder
// (MessagePack + gzip, type-safe on load), plus JSON persistence
// for run configuration so a saved model can be rebuilt with the
// exact architecture that produced it.
//
// File naming convention:
//   {dir}/{name}.mpk.gz   ← model weights (extension added by the recorder)
//   {dir}/{name}.json     ← a serialised config

use anyhow::{Context, Result};
use burn::{
    module::Module,
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::PathBuf};

/// Manages saving and loading of model checkpoints under one
/// directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save model weights under `name`. Returns the path the
    /// recorder wrote to (without the recorder's extension).
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, name: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint '{}'", path.display());
        Ok(path)
    }

    /// Load weights saved under `name` into `model`. The model
    /// must have the architecture the checkpoint was saved with,
    /// or loading fails.
    pub fn load_model<B: Backend, M: Module<B>>(
        &self,
        model:  M,
        name:   &str,
        device: &B::Device,
    ) -> Result<M> {
        let path = self.dir.join(name);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Has the pretrained model been placed there?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Persist a run configuration as pretty-printed JSON.
    pub fn save_config<C: Serialize>(&self, cfg: &C, name: &str) -> Result<()> {
        let path = self.dir.join(format!("{name}.json"));
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        Ok(())
    }

    pub fn load_config<C: DeserializeOwned>(&self, name: &str) -> Result<C> {
        let path = self.dir.join(format!("{name}.json"));
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::nn::{Linear, LinearConfig};

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_model_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());
        let device = Default::default();

        let saved: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        manager.save_model(&saved, "head").unwrap();

        let input = Tensor::<TestBackend, 2>::ones([1, 4], &device);
        let expect: Vec<f32> = saved.forward(input.clone()).into_data().to_vec().unwrap();

        let fresh: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        let loaded = manager.load_model(fresh, "head", &device).unwrap();
        let got: Vec<f32> = loaded.forward(input).into_data().to_vec().unwrap();

        assert_eq!(expect, got);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());
        let device = Default::default();

        let model: Linear<TestBackend> = LinearConfig::new(2, 2).init(&device);
        assert!(manager.load_model(model, "absent", &device).is_err());
    }

    #[test]
    fn test_config_round_trip() {
        #[derive(Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Cfg {
            lr: f64,
        }

        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());
        manager.save_config(&Cfg { lr: 0.005 }, "run").unwrap();
        let loaded: Cfg = manager.load_config("run").unwrap();
        assert_eq!(loaded, Cfg { lr: 0.005 });
    }
}
