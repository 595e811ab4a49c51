// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap, picks the tensor backend, and hands off to Layer 2.
//
// Two commands are supported:
//   1. `test`   — evaluate a checkpoint on the test set
//   2. `freeze` — export a checkpoint as a frozen model
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::backend::{
    ndarray::{NdArray, NdArrayDevice},
    wgpu::{Wgpu, WgpuDevice},
};
use clap::Parser;
use commands::{BackendKind, Commands, FreezeArgs, TestArgs};

use crate::application::{
    freeze_use_case::FreezeUseCase,
    test_use_case::TestUseCase,
};
use crate::infra::logging;

#[derive(Parser, Debug)]
#[command(
    name = "sann-eval",
    version,
    about = "Restore a trained SANN text-pair classifier, score it on a test set and export a frozen model."
)]
pub struct Cli {
    /// The subcommand to run (test or freeze)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Test(args)   => run_test(args),
            Commands::Freeze(args) => run_freeze(args),
        }
    }
}

/// Handles the `test` subcommand.
fn run_test(args: TestArgs) -> Result<()> {
    let log_path = logging::init(&args.log_dir)?;
    tracing::info!("Logging to '{}'", log_path.display());

    let use_case = TestUseCase::new((&args).into());
    let summary = match args.run.backend {
        BackendKind::NdArray => {
            use_case.execute::<NdArray>(&NdArrayDevice::default())?
        }
        BackendKind::Wgpu => {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            use_case.execute::<Wgpu>(&device)?
        }
    };

    println!("\n{}", summary.report);
    println!("Checkpoint:   {}", summary.checkpoint.display());
    println!("Frozen model: {}", summary.graph_path.display());
    println!("Predictions:  {}", summary.predictions_path.display());
    Ok(())
}

/// Handles the `freeze` subcommand.
fn run_freeze(args: FreezeArgs) -> Result<()> {
    logging::init_console()?;

    let use_case = FreezeUseCase::new((&args).into());
    let path = match args.run.backend {
        BackendKind::NdArray => use_case.execute::<NdArray>(&NdArrayDevice::default())?,
        BackendKind::Wgpu    => use_case.execute::<Wgpu>(&WgpuDevice::default())?,
    };

    println!("Frozen model: {}", path.display());
    Ok(())
}
