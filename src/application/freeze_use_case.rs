// ============================================================
// Layer 2 — FreezeUseCase
// ============================================================
// Restores one checkpoint of a run and exports it as a frozen
// model:
//
//   Step 1: Open the run directory         (Layer 6 - infra)
//   Step 2: Pick best / latest checkpoint   (Layer 6 - infra)
//   Step 3: Rebuild model + load weights    (Layer 6 - infra)
//   Step 4: Write graph-sann-<model>.pb     (Layer 6 - infra)
//   Step 5: Reload it to check the export   (Layer 6 - infra)
//
// Steps 1–3 are also the first half of the test workflow.

use anyhow::Result;
use burn::prelude::*;
use std::path::PathBuf;

use crate::domain::prediction::CheckpointChoice;
use crate::infra::{checkpoint::CheckpointManager, frozen_graph::FrozenGraph};
use crate::ml::model::{SannConfig, SannModel};

/// A model restored from a run directory.
pub struct Restored<B: Backend> {
    /// Stem path of the checkpoint that was loaded
    pub checkpoint: PathBuf,
    pub config:     SannConfig,
    pub model:      SannModel<B>,
}

/// Select a checkpoint of an opened run and load it.
pub fn restore<B: Backend>(
    manager: &CheckpointManager,
    choice:  CheckpointChoice,
    device:  &B::Device,
) -> Result<Restored<B>> {
    match choice {
        CheckpointChoice::Best   => tracing::info!("Loading best model..."),
        CheckpointChoice::Latest => tracing::info!("Loading latest model..."),
    }
    let checkpoint = manager.select(choice)?;
    tracing::info!("{}", checkpoint.display());

    let (config, model) = manager.load_model::<B>(&checkpoint, device)?;
    Ok(Restored { checkpoint, config, model })
}

#[derive(Debug, Clone)]
pub struct FreezeConfig {
    pub model_name: String,
    pub checkpoint: CheckpointChoice,
    pub runs_dir:   String,
    pub graph_dir:  String,
}

pub struct FreezeUseCase {
    config: FreezeConfig,
}

impl FreezeUseCase {
    pub fn new(config: FreezeConfig) -> Self {
        Self { config }
    }

    /// Export the chosen checkpoint. Returns the frozen weights path.
    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<PathBuf> {
        let cfg = &self.config;

        let manager  = CheckpointManager::open(&cfg.runs_dir, &cfg.model_name)?;
        let restored = restore::<B>(&manager, cfg.checkpoint, device)?;

        let frozen = FrozenGraph::new(&cfg.graph_dir);
        let path   = frozen.export(&cfg.model_name, &restored.model, &restored.config)?;
        tracing::info!("Frozen model written to '{}'", path.display());

        frozen.load::<B>(&cfg.model_name, device)?;
        tracing::info!("Frozen model reloads cleanly");
        Ok(path)
    }
}
