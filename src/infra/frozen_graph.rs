// ============================================================
// Layer 6 — Frozen Graph Export
// ============================================================
// Writes an inference-only copy of a restored model, detached
// from the run directory it came from:
//
//   graph/
//     graph-sann-<model>.pb    ← weights, full precision,
//                                Burn BinBytesRecorder format
//     graph-sann-<model>.json  ← architecture config and the
//                                names of the exported outputs
//
// Loading both files rebuilds the model exactly as it was
// exported: no checkpoint discovery, no half-precision round
// trip.
//
// Reference: Burn Book §5 (Records)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::{SannConfig, SannModel};

/// Outputs an exported model serves, '|'-separated.
pub const OUTPUT_NODE_NAMES: &str = "output/predictions|output/topKPreds";

/// Sidecar describing the exported weights.
#[derive(Debug, Serialize, Deserialize)]
pub struct FrozenGraphHeader {
    pub model:        String,
    pub output_nodes: Vec<String>,
    pub config:       SannConfig,
}

/// Reads and writes frozen models in one directory.
pub struct FrozenGraph {
    dir: PathBuf,
}

impl FrozenGraph {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn graph_path(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("graph-sann-{model_name}.pb"))
    }

    pub fn header_path(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("graph-sann-{model_name}.json"))
    }

    /// Export `model` and its config. Returns the weights path.
    pub fn export<B: Backend>(
        &self,
        model_name: &str,
        model:      &SannModel<B>,
        config:     &SannConfig,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create graph directory '{}'", self.dir.display()))?;

        let bytes = BinBytesRecorder::<FullPrecisionSettings>::default()
            .record(model.clone().into_record(), ())
            .context("Cannot serialise model weights")?;
        let graph_path = self.graph_path(model_name);
        fs::write(&graph_path, bytes)
            .with_context(|| format!("Cannot write '{}'", graph_path.display()))?;

        let header = FrozenGraphHeader {
            model:        model_name.to_string(),
            output_nodes: OUTPUT_NODE_NAMES.split('|').map(str::to_string).collect(),
            config:       config.clone(),
        };
        let header_path = self.header_path(model_name);
        fs::write(&header_path, serde_json::to_string_pretty(&header)?)
            .with_context(|| format!("Cannot write '{}'", header_path.display()))?;

        Ok(graph_path)
    }

    /// Rebuild a model from a previous `export`.
    pub fn load<B: Backend>(&self, model_name: &str, device: &B::Device) -> Result<SannModel<B>> {
        let header = read_header(&self.header_path(model_name))?;

        let graph_path = self.graph_path(model_name);
        let bytes = fs::read(&graph_path)
            .with_context(|| format!("Cannot read '{}'", graph_path.display()))?;
        let record = BinBytesRecorder::<FullPrecisionSettings>::default()
            .load(bytes, device)
            .with_context(|| format!("Corrupt frozen graph '{}'", graph_path.display()))?;

        Ok(header.config.init::<B>(device).load_record(record))
    }
}

fn read_header(path: &Path) -> Result<FrozenGraphHeader> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid header '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_support::{tiny_config, TestBackend};
    use tempfile::TempDir;

    #[test]
    fn test_export_then_load_gives_identical_outputs() {
        let tmp    = TempDir::new().unwrap();
        let device = Default::default();
        let cfg    = tiny_config();
        let model  = cfg.init::<TestBackend>(&device);

        let frozen = FrozenGraph::new(tmp.path().join("graph"));
        let path   = frozen.export("1700000000", &model, &cfg).unwrap();
        assert!(path.ends_with("graph-sann-1700000000.pb"));

        let reloaded = frozen.load::<TestBackend>("1700000000", &device).unwrap();

        let tokens = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![3i64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8], [2, 6]),
            &device,
        );
        let a: Vec<f32> = model.forward(tokens.clone(), tokens.clone())
            .logits.into_data().convert::<f32>().to_vec().unwrap();
        let b: Vec<f32> = reloaded.forward(tokens.clone(), tokens)
            .logits.into_data().convert::<f32>().to_vec().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_header_lists_output_nodes() {
        let tmp    = TempDir::new().unwrap();
        let device = Default::default();
        let cfg    = tiny_config();
        let model  = cfg.init::<TestBackend>(&device);

        let frozen = FrozenGraph::new(tmp.path());
        frozen.export("m", &model, &cfg).unwrap();

        let header = read_header(&frozen.header_path("m")).unwrap();
        assert_eq!(header.output_nodes, vec!["output/predictions", "output/topKPreds"]);
        assert_eq!(header.config.vocab_size, 20);
    }

    #[test]
    fn test_load_missing_graph_fails() {
        let tmp = TempDir::new().unwrap();
        let device = Default::default();
        assert!(FrozenGraph::new(tmp.path()).load::<TestBackend>("missing", &device).is_err());
    }
}
