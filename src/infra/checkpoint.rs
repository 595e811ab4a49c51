// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Finds and restores the saved weights of one training run.
//
// Run directory layout:
//   runs/<model>/
//     sann_config.json                  ← architecture config
//     checkpoints/
//       model-100.mpk                   ← periodic checkpoints
//       model-200.mpk
//     bestcheckpoints/
//       checkpoints.json                ← {"model-200": 0.91, ...}
//       model-200.mpk                   ← best-so-far checkpoints
//
// Two ways to pick a checkpoint:
//   Latest — newest modification time in checkpoints/,
//            ties broken by the larger step number
//   Best   — entry of bestcheckpoints/checkpoints.json with the
//            maximum (or minimum) tracked metric
//
// Why save the config separately?
//   Burn restores weights INTO an existing model, so the exact
//   architecture must be rebuilt first. The config is what
//   makes that possible.
//
// Checkpoints are read with Burn's CompactRecorder (named
// MessagePack, half precision). Paths handed around in this
// module are stems without the ".mpk" extension; the recorder
// adds it.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, bail, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::domain::prediction::CheckpointChoice;
use crate::ml::model::{SannConfig, SannModel};

const CONFIG_FILE:   &str = "sann_config.json";
const BEST_REGISTRY: &str = "checkpoints.json";
/// Extension CompactRecorder appends to a checkpoint stem
const CKPT_EXT:      &str = ".mpk";

/// Manages the checkpoints of a single run directory.
pub struct CheckpointManager {
    run_dir: PathBuf,
}

impl CheckpointManager {
    /// Open an existing run. Fails if the run directory is missing.
    pub fn open(runs_dir: impl AsRef<Path>, model_name: &str) -> Result<Self> {
        let run_dir = runs_dir.as_ref().join(model_name);
        if !run_dir.is_dir() {
            bail!(
                "Run directory '{}' does not exist. Check the model name.",
                run_dir.display()
            );
        }
        Ok(Self { run_dir })
    }

    pub fn checkpoints_dir(&self) -> PathBuf {
        self.run_dir.join("checkpoints")
    }

    pub fn best_dir(&self) -> PathBuf {
        self.run_dir.join("bestcheckpoints")
    }

    // ─── Config ───────────────────────────────────────────────────────────────

    pub fn load_config(&self) -> Result<SannConfig> {
        let path = self.run_dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read model config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid model config in '{}'", path.display()))
    }

    // ─── Selection ────────────────────────────────────────────────────────────

    /// Resolve a checkpoint choice to a checkpoint stem path.
    pub fn select(&self, choice: CheckpointChoice) -> Result<PathBuf> {
        match choice {
            CheckpointChoice::Best   => self.best_checkpoint(true),
            CheckpointChoice::Latest => self.latest_checkpoint(),
        }
    }

    /// The most recently modified checkpoint in checkpoints/.
    pub fn latest_checkpoint(&self) -> Result<PathBuf> {
        let dir = self.checkpoints_dir();
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Cannot read checkpoint directory '{}'", dir.display()))?;

        let mut newest: Option<(SystemTime, usize, PathBuf)> = None;
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let stem = match file_name.to_str().and_then(|n| n.strip_suffix(CKPT_EXT)) {
                Some(s) => s.to_string(),
                None    => continue,
            };
            let modified = entry.metadata()?.modified()?;
            let step = checkpoint_step(&stem).unwrap_or(0);

            let is_newer = match &newest {
                Some((t, s, _)) => (modified, step) > (*t, *s),
                None            => true,
            };
            if is_newer {
                newest = Some((modified, step, dir.join(stem)));
            }
        }

        newest
            .map(|(_, _, path)| path)
            .ok_or_else(|| anyhow!("No checkpoints found in '{}'", dir.display()))
    }

    /// The best tracked checkpoint in bestcheckpoints/.
    ///
    /// `select_maximum_value` picks the highest metric (accuracy-like);
    /// false picks the lowest (loss-like). Ties keep the entry that
    /// sorts first by name.
    pub fn best_checkpoint(&self, select_maximum_value: bool) -> Result<PathBuf> {
        let registry = self.best_registry()?;

        let mut best: Option<(&String, f64)> = None;
        for (name, &value) in &registry {
            let better = match best {
                Some((_, v)) if select_maximum_value => value > v,
                Some((_, v))                         => value < v,
                None                                 => true,
            };
            if better {
                best = Some((name, value));
            }
        }

        let (name, value) = best.ok_or_else(|| {
            anyhow!("No best checkpoints registered in '{}'", self.best_dir().display())
        })?;
        tracing::debug!("Best checkpoint {} (metric {})", name, value);
        Ok(self.best_dir().join(name))
    }

    /// The tracked best checkpoints. A missing registry is empty;
    /// an unreadable or corrupt one is an error.
    fn best_registry(&self) -> Result<BTreeMap<String, f64>> {
        let path = self.best_dir().join(BEST_REGISTRY);
        let json = match fs::read_to_string(&path) {
            Ok(json)                                   => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Cannot read best checkpoint registry '{}'", path.display())
                })
            }
        };
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid best checkpoint registry '{}'", path.display()))
    }

    // ─── Loading ──────────────────────────────────────────────────────────────

    /// Rebuild the model from the saved config and load the weights
    /// stored at `checkpoint` (a stem path from `select`).
    pub fn load_model<B: Backend>(
        &self,
        checkpoint: &Path,
        device:     &B::Device,
    ) -> Result<(SannConfig, SannModel<B>)> {
        let cfg   = self.load_config()?;
        let model = cfg.init::<B>(device);

        let record = CompactRecorder::new()
            .load(checkpoint.to_path_buf(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", checkpoint.display()))?;

        Ok((cfg, model.load_record(record)))
    }
}

/// Step number of a "model-<step>" stem.
fn checkpoint_step(stem: &str) -> Option<usize> {
    stem.rsplit('-').next()?.parse().ok()
}

// ─── Run Builders ─────────────────────────────────────────────────────────────
// Writing runs is the trainer's job; tests use these to lay out
// fixture runs in the same format.
#[cfg(test)]
impl CheckpointManager {
    /// Create (or reuse) a run directory with its checkpoint folders.
    pub fn create(runs_dir: impl AsRef<Path>, model_name: &str) -> Result<Self> {
        let manager = Self { run_dir: runs_dir.as_ref().join(model_name) };
        fs::create_dir_all(manager.checkpoints_dir())
            .and_then(|_| fs::create_dir_all(manager.best_dir()))
            .with_context(|| format!("Cannot create run directory '{}'", manager.run_dir.display()))?;
        Ok(manager)
    }

    pub fn save_config(&self, cfg: &SannConfig) -> Result<()> {
        let path = self.run_dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))
    }

    /// Write `model` as checkpoints/model-<step>. Returns the stem path.
    pub fn save_checkpoint<B: Backend>(&self, model: &SannModel<B>, step: usize) -> Result<PathBuf> {
        let stem = self.checkpoints_dir().join(format!("model-{step}"));
        record_model(model, &stem)?;
        Ok(stem)
    }

    /// Write `model` into bestcheckpoints/ and record its metric.
    pub fn register_best<B: Backend>(
        &self,
        model:  &SannModel<B>,
        step:   usize,
        metric: f64,
    ) -> Result<PathBuf> {
        let name = format!("model-{step}");
        let mut registry = self.best_registry()?;

        let stem = self.best_dir().join(&name);
        record_model(model, &stem)?;

        registry.insert(name, metric);
        let path = self.best_dir().join(BEST_REGISTRY);
        fs::write(&path, serde_json::to_string_pretty(&registry)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(stem)
    }
}

#[cfg(test)]
fn record_model<B: Backend>(model: &SannModel<B>, stem: &Path) -> Result<()> {
    CompactRecorder::new()
        .record(model.clone().into_record(), stem.to_path_buf())
        .with_context(|| format!("Failed to save checkpoint to '{}'", stem.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_support::{tiny_config, TestBackend};
    use std::time::Duration;
    use tempfile::TempDir;

    fn run_with_config(tmp: &TempDir) -> CheckpointManager {
        let mgr = CheckpointManager::create(tmp.path(), "1700000000").unwrap();
        mgr.save_config(&tiny_config()).unwrap();
        mgr
    }

    fn set_mtime(stem: &Path, secs: u64) {
        let mut path = stem.as_os_str().to_owned();
        path.push(CKPT_EXT);
        let f = fs::File::options().write(true).open(PathBuf::from(path)).unwrap();
        f.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
    }

    #[test]
    fn test_open_missing_run_fails() {
        let tmp = TempDir::new().unwrap();
        let err = CheckpointManager::open(tmp.path(), "nope").err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_latest_prefers_modification_time_over_step() {
        let tmp    = TempDir::new().unwrap();
        let mgr    = run_with_config(&tmp);
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let old = mgr.save_checkpoint(&model, 200).unwrap();
        let new = mgr.save_checkpoint(&model, 100).unwrap();
        set_mtime(&old, 1_000);
        set_mtime(&new, 2_000);

        assert_eq!(mgr.select(CheckpointChoice::Latest).unwrap(), new);
    }

    #[test]
    fn test_latest_ties_break_on_step() {
        let tmp    = TempDir::new().unwrap();
        let mgr    = run_with_config(&tmp);
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let a = mgr.save_checkpoint(&model, 100).unwrap();
        let b = mgr.save_checkpoint(&model, 300).unwrap();
        set_mtime(&a, 5_000);
        set_mtime(&b, 5_000);

        assert_eq!(mgr.latest_checkpoint().unwrap(), b);
    }

    #[test]
    fn test_latest_on_empty_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let mgr = run_with_config(&tmp);
        assert!(mgr.latest_checkpoint().is_err());
    }

    #[test]
    fn test_best_selects_max_or_min() {
        let tmp    = TempDir::new().unwrap();
        let mgr    = run_with_config(&tmp);
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        mgr.register_best(&model, 100, 0.71).unwrap();
        mgr.register_best(&model, 200, 0.93).unwrap();
        mgr.register_best(&model, 300, 0.85).unwrap();

        assert_eq!(mgr.select(CheckpointChoice::Best).unwrap(), mgr.best_dir().join("model-200"));
        assert_eq!(mgr.best_checkpoint(false).unwrap(), mgr.best_dir().join("model-100"));
    }

    #[test]
    fn test_best_without_registry_fails() {
        let tmp = TempDir::new().unwrap();
        let mgr = run_with_config(&tmp);
        assert!(mgr.best_checkpoint(true).is_err());
    }

    #[test]
    fn test_save_then_load_restores_weights() {
        let tmp    = TempDir::new().unwrap();
        let mgr    = run_with_config(&tmp);
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let stem = mgr.save_checkpoint(&model, 1).unwrap();
        let (cfg, restored) = mgr.load_model::<TestBackend>(&stem, &device).unwrap();
        assert_eq!(cfg.num_classes, 2);

        let original: Vec<f32> = model.output.weight.val().into_data().convert::<f32>().to_vec().unwrap();
        let loaded: Vec<f32>   = restored.output.weight.val().into_data().convert::<f32>().to_vec().unwrap();
        // Checkpoints are stored at half precision
        for (a, b) in original.iter().zip(&loaded) {
            assert!((a - b).abs() < 1e-2);
        }
    }

    #[test]
    fn test_saved_checkpoint_is_found_as_latest() {
        let tmp    = TempDir::new().unwrap();
        let mgr    = run_with_config(&tmp);
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let stem = mgr.save_checkpoint(&model, 7).unwrap();
        assert!(mgr.checkpoints_dir().join(format!("model-7{CKPT_EXT}")).is_file());
        assert_eq!(mgr.latest_checkpoint().unwrap(), stem);
    }

    #[test]
    fn test_corrupt_registry_is_an_error_and_left_untouched() {
        let tmp    = TempDir::new().unwrap();
        let mgr    = run_with_config(&tmp);
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let path = mgr.best_dir().join(BEST_REGISTRY);
        fs::write(&path, r#"{"model-1": 0.9,"#).unwrap();

        let err = mgr.register_best(&model, 2, 0.5).unwrap_err();
        assert!(err.to_string().contains("Invalid best checkpoint registry"));
        assert!(mgr.best_checkpoint(true).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"model-1": 0.9,"#);
    }

    #[test]
    fn test_checkpoint_step_parsing() {
        assert_eq!(checkpoint_step("model-1200"), Some(1200));
        assert_eq!(checkpoint_step("model"), None);
    }
}
