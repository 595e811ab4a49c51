// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `test` and `freeze`, and all
// their configurable flags.
//
// clap's derive macros generate --help text, missing-argument
// errors and string → number / enum conversion.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{builder::RangedU64ValueParser, Args, Subcommand, ValueEnum};

use crate::application::{freeze_use_case::FreezeConfig, test_use_case::TestConfig};
use crate::domain::prediction::CheckpointChoice;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a trained model on the test set and export it
    Test(TestArgs),

    /// Only export a trained checkpoint as a frozen model
    Freeze(FreezeArgs),
}

/// Which checkpoint of the run to restore
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CheckpointArg {
    /// Highest tracked validation metric
    Best,
    /// Most recently written
    Latest,
}

impl From<CheckpointArg> for CheckpointChoice {
    fn from(a: CheckpointArg) -> Self {
        match a {
            CheckpointArg::Best   => CheckpointChoice::Best,
            CheckpointArg::Latest => CheckpointChoice::Latest,
        }
    }
}

/// Tensor backend to run the model on
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum BackendKind {
    /// CPU
    NdArray,
    /// GPU through wgpu (Vulkan / Metal / DX12)
    Wgpu,
}

/// Flags shared by every subcommand: which run and checkpoint
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name of the training run (directory under --runs-dir)
    #[arg(long)]
    pub model: String,

    /// Restore the best or the latest checkpoint
    #[arg(long, value_enum, default_value_t = CheckpointArg::Best)]
    pub checkpoint: CheckpointArg,

    /// Directory holding one sub-directory per training run
    #[arg(long, default_value = "runs")]
    pub runs_dir: String,

    /// Directory the frozen model is written to
    #[arg(long, default_value = "graph")]
    pub graph_dir: String,

    /// Backend to use (ndarray or wgpu)
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,
}

/// All arguments for the `test` command
#[derive(Args, Debug)]
pub struct TestArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// JSON-lines file with the labelled test pairs
    #[arg(long, default_value = "data/test_sample.json")]
    pub test_file: String,

    /// word2vec text file used to map words to token ids
    #[arg(long, default_value = "data/word2vec_100.txt")]
    pub word2vec_file: String,

    /// Length every sequence is padded / truncated to
    #[arg(long, default_value_t = 120)]
    pub pad_seq_len: usize,

    /// Number of pairs scored together in one forward pass
    #[arg(long, default_value_t = 64, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub batch_size: usize,

    /// Root directory for predictions and metrics history
    #[arg(long, default_value = "output")]
    pub output_dir: String,

    /// Directory for the per-run log file
    #[arg(long, default_value = "logs")]
    pub log_dir: String,
}

/// All arguments for the `freeze` command
#[derive(Args, Debug)]
pub struct FreezeArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

/// Convert CLI TestArgs into the application-layer TestConfig.
impl From<&TestArgs> for TestConfig {
    fn from(a: &TestArgs) -> Self {
        TestConfig {
            model_name:    a.run.model.clone(),
            checkpoint:    a.run.checkpoint.into(),
            runs_dir:      a.run.runs_dir.clone(),
            test_file:     a.test_file.clone(),
            word2vec_file: a.word2vec_file.clone(),
            pad_seq_len:   a.pad_seq_len,
            batch_size:    a.batch_size,
            graph_dir:     a.run.graph_dir.clone(),
            output_dir:    a.output_dir.clone(),
        }
    }
}

impl From<&FreezeArgs> for FreezeConfig {
    fn from(a: &FreezeArgs) -> Self {
        FreezeConfig {
            model_name: a.run.model.clone(),
            checkpoint: a.run.checkpoint.into(),
            runs_dir:   a.run.runs_dir.clone(),
            graph_dir:  a.run.graph_dir.clone(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use crate::cli::{commands::Commands, Cli};
    use clap::Parser;

    fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["sann-eval", "test", "--model", "1700000000"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let Commands::Test(args) = parse(&[]).unwrap().command else {
            panic!("expected the test subcommand");
        };
        assert_eq!(args.batch_size, 64);
        assert_eq!(args.pad_seq_len, 120);
        assert_eq!(args.run.runs_dir, "runs");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        assert!(parse(&["--batch-size", "0"]).is_err());
        assert!(parse(&["--batch-size", "1"]).is_ok());
    }
}
