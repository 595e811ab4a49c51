// ============================================================
// Layer 2 — TestUseCase
// ============================================================
// Orchestrates one full evaluation of a trained model:
//
//   Step 1: Log the run parameters
//   Step 2: Open the run, read its model config  (Layer 6 - infra)
//   Step 3: Load vocabulary and test set         (Layer 4 - data)
//   Step 4: Pad every sequence                   (Layer 4 - data)
//   Step 5: Restore the chosen checkpoint        (Layer 6 - infra)
//   Step 6: Export the frozen model              (Layer 6 - infra)
//   Step 7: Score the test set batch by batch    (Layer 5 - ml)
//   Step 8: Compute aggregate metrics            (Layer 5 - ml)
//   Step 9: Write predictions + metrics history  (Layer 6 - infra)
//
// Any failure ends the run with the error's context chain.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Inference)

use anyhow::{bail, Result};
use burn::prelude::*;
use std::path::{Path, PathBuf};

use crate::application::freeze_use_case::restore;
use crate::data::{embedding::Word2VecVocab, loader::JsonLinesLoader, padding::pad_data};
use crate::domain::{prediction::CheckpointChoice, traits::ExampleSource};
use crate::infra::{
    checkpoint::CheckpointManager,
    frozen_graph::FrozenGraph,
    metrics::MetricsHistory,
    predictions::{build_records, create_prediction_file},
};
use crate::ml::{evaluator::run_evaluation, inferencer::Inferencer, metrics::MetricReport};

// ─── Test Configuration ───────────────────────────────────────────────────────
// Everything one evaluation run needs. Built from the CLI
// arguments; the application layer never sees clap types.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub model_name:    String,
    pub checkpoint:    CheckpointChoice,
    pub runs_dir:      String,
    pub test_file:     String,
    pub word2vec_file: String,
    pub pad_seq_len:   usize,
    pub batch_size:    usize,
    pub graph_dir:     String,
    pub output_dir:    String,
}

impl TestConfig {
    /// Log every parameter on its own line, aligned.
    pub fn log_parameters(&self) {
        let params: [(&str, String); 9] = [
            ("model",         self.model_name.clone()),
            ("checkpoint",    self.checkpoint.to_string()),
            ("runs_dir",      self.runs_dir.clone()),
            ("test_file",     self.test_file.clone()),
            ("word2vec_file", self.word2vec_file.clone()),
            ("pad_seq_len",   self.pad_seq_len.to_string()),
            ("batch_size",    self.batch_size.to_string()),
            ("graph_dir",     self.graph_dir.clone()),
            ("output_dir",    self.output_dir.clone()),
        ];
        tracing::info!("Parameters:");
        for (name, value) in params {
            tracing::info!("  {:<14} {}", name, value);
        }
    }

    /// output/<model>
    pub fn save_dir(&self) -> PathBuf {
        Path::new(&self.output_dir).join(&self.model_name)
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct TestSummary {
    pub checkpoint:       PathBuf,
    pub report:           MetricReport,
    pub graph_path:       PathBuf,
    pub predictions_path: PathBuf,
}

// ─── TestUseCase ──────────────────────────────────────────────────────────────
pub struct TestUseCase {
    config: TestConfig,
}

impl TestUseCase {
    pub fn new(config: TestConfig) -> Self {
        Self { config }
    }

    /// Execute the full evaluation pipeline on backend `B`.
    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<TestSummary> {
        let cfg = &self.config;

        // ── Step 1: Parameters ────────────────────────────────────────────────
        cfg.log_parameters();

        // ── Step 2: Run directory + architecture ──────────────────────────────
        // The label width (num_classes) comes from the trained model
        let manager   = CheckpointManager::open(&cfg.runs_dir, &cfg.model_name)?;
        let model_cfg = manager.load_config()?;

        // ── Step 3: Vocabulary and test set ───────────────────────────────────
        tracing::info!("Loading data...");
        let vocab = Word2VecVocab::load(&cfg.word2vec_file)?;
        if vocab.is_empty() {
            bail!("word2vec file '{}' has no words", cfg.word2vec_file);
        }
        tracing::info!(
            "Vocabulary: {} words, {}-d vectors",
            vocab.len(),
            vocab.vector_size()
        );
        if vocab.id_bound() > model_cfg.vocab_size {
            bail!(
                "Vocabulary in '{}' has {} ids but the model only embeds {}",
                cfg.word2vec_file,
                vocab.id_bound(),
                model_cfg.vocab_size
            );
        }

        tracing::info!("Data processing...");
        let test_set = JsonLinesLoader::new(&cfg.test_file, &vocab, model_cfg.num_classes)
            .load_all()?;
        if test_set.is_empty() {
            bail!("Test file '{}' contains no examples", cfg.test_file);
        }
        tracing::info!("Loaded {} test pairs", test_set.len());

        // ── Step 4: Padding ───────────────────────────────────────────────────
        tracing::info!("Data padding...");
        if cfg.pad_seq_len != model_cfg.sequence_length {
            tracing::warn!(
                "pad_seq_len {} differs from the trained sequence length {}",
                cfg.pad_seq_len,
                model_cfg.sequence_length
            );
        }
        let padded = pad_data(&test_set, cfg.pad_seq_len);

        // ── Step 5: Restore the model ─────────────────────────────────────────
        let restored = restore::<B>(&manager, cfg.checkpoint, device)?;

        // ── Step 6: Frozen model ──────────────────────────────────────────────
        let graph_path = FrozenGraph::new(&cfg.graph_dir)
            .export(&cfg.model_name, &restored.model, &restored.config)?;
        tracing::info!("Frozen model written to '{}'", graph_path.display());

        // ── Step 7: One pass over the test set ────────────────────────────────
        let inferencer = Inferencer::new(restored.model, device.clone());
        let outcome    = run_evaluation(&inferencer, &padded, cfg.batch_size)?;

        // ── Step 8: Metrics ───────────────────────────────────────────────────
        let top1   = outcome.top1_scores();
        let report = MetricReport::compute(
            outcome.loss,
            &outcome.labels,
            &outcome.predicted_labels,
            &top1,
        );
        if report.auc.is_none() {
            tracing::warn!("AUC is undefined: the test labels contain a single class");
        }
        tracing::info!("All Test Dataset: {}", report);

        // ── Step 9: Persist ───────────────────────────────────────────────────
        let save_dir         = cfg.save_dir();
        let predictions_path = save_dir.join("predictions.json");
        let records = build_records(&test_set, &outcome.labels, &outcome.predicted_labels, &top1)?;
        create_prediction_file(&predictions_path, &records)?;

        let checkpoint_name = restored
            .checkpoint
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        MetricsHistory::new(&save_dir)?.log(&checkpoint_name, &report)?;

        tracing::info!("All Done.");
        Ok(TestSummary {
            checkpoint: restored.checkpoint,
            report,
            graph_path,
            predictions_path,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::test_support::{tiny_config, TestBackend};
    use std::fs;
    use tempfile::TempDir;

    const MODEL: &str = "1700000000";

    /// A run with one latest and one best checkpoint, a 5-word
    /// vocabulary and a 5-example test file.
    fn fixture(tmp: &TempDir) -> TestConfig {
        let root   = tmp.path();
        let device = Default::default();

        let manager = CheckpointManager::create(root.join("runs"), MODEL).unwrap();
        manager.save_config(&tiny_config()).unwrap();
        let model = tiny_config().init::<TestBackend>(&device);
        manager.save_checkpoint(&model, 100).unwrap();
        manager.register_best(&model, 100, 0.8).unwrap();

        fs::write(
            root.join("w2v.txt"),
            "5 2\nhow 0.1 0.1\nto 0.2 0.2\ncook 0.3 0.3\nboil 0.4 0.4\nrice 0.5 0.5\n",
        )
        .unwrap();

        let lines = [
            r#"{"front_testid":"f1","behind_testid":"b1","front_features":["how","to","cook","rice"],"behind_features":["how","to","boil","rice"],"label":1}"#,
            r#"{"front_testid":"f2","behind_testid":"b2","front_features":["cook"],"behind_features":["rice"],"label":0}"#,
            r#"{"front_testid":"f3","behind_testid":"b3","front_features":["boil","pasta"],"behind_features":["how"],"label":0}"#,
            r#"{"front_testid":"f4","behind_testid":"b4","front_features":["to"],"behind_features":["to","cook"],"label":1}"#,
            r#"{"front_testid":"f5","behind_testid":"b5","front_features":[],"behind_features":["rice","rice"],"label":1}"#,
        ];
        fs::write(root.join("test.json"), lines.join("\n")).unwrap();

        let path = |p: &str| root.join(p).to_string_lossy().into_owned();
        TestConfig {
            model_name:    MODEL.into(),
            checkpoint:    CheckpointChoice::Best,
            runs_dir:      path("runs"),
            test_file:     path("test.json"),
            word2vec_file: path("w2v.txt"),
            pad_seq_len:   6,
            batch_size:    2,
            graph_dir:     path("graph"),
            output_dir:    path("output"),
        }
    }

    #[test]
    fn test_end_to_end_best_checkpoint() {
        let tmp    = TempDir::new().unwrap();
        let cfg    = fixture(&tmp);
        let device = Default::default();

        let summary = TestUseCase::new(cfg.clone()).execute::<TestBackend>(&device).unwrap();

        assert!(summary.checkpoint.ends_with("bestcheckpoints/model-100"));
        assert!(summary.graph_path.ends_with("graph-sann-1700000000.pb"));
        assert!(summary.graph_path.exists());

        let r = &summary.report;
        assert!((0.0..=1.0).contains(&r.accuracy));
        // Micro averages collapse to accuracy for single-label data
        assert!((r.precision - r.accuracy).abs() < 1e-12);
        assert!((r.f1 - r.accuracy).abs() < 1e-12);
        assert!(r.auc.is_some());
        assert!(r.loss.is_finite());

        let predictions = fs::read_to_string(&summary.predictions_path).unwrap();
        let ids: Vec<String> = predictions
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["front_testid"]
                .as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["f1", "f2", "f3", "f4", "f5"]);

        let history = fs::read_to_string(cfg.save_dir().join("metrics.csv")).unwrap();
        assert_eq!(history.lines().count(), 2);
        assert!(history.lines().nth(1).unwrap().contains(",model-100,"));
    }

    #[test]
    fn test_latest_checkpoint_is_used_when_asked() {
        let tmp    = TempDir::new().unwrap();
        let mut cfg = fixture(&tmp);
        cfg.checkpoint = CheckpointChoice::Latest;
        let device = Default::default();

        let summary = TestUseCase::new(cfg).execute::<TestBackend>(&device).unwrap();
        assert!(summary.checkpoint.ends_with("checkpoints/model-100"));
        assert!(!summary.checkpoint.to_string_lossy().contains("bestcheckpoints"));
    }

    #[test]
    fn test_unknown_model_fails_before_loading_data() {
        let tmp    = TempDir::new().unwrap();
        let mut cfg = fixture(&tmp);
        cfg.model_name = "0000000000".into();
        let device = Default::default();

        let err = TestUseCase::new(cfg).execute::<TestBackend>(&device).err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_vocabulary_larger_than_model_is_rejected() {
        let tmp    = TempDir::new().unwrap();
        let cfg    = fixture(&tmp);
        let words: String = (0..30).map(|i| format!("w{i} 0.0 0.0\n")).collect();
        fs::write(&cfg.word2vec_file, format!("30 2\n{words}")).unwrap();
        let device = Default::default();

        assert!(TestUseCase::new(cfg).execute::<TestBackend>(&device).is_err());
    }

    #[test]
    fn test_single_class_run_reports_undefined_auc_and_still_saves() {
        let tmp    = TempDir::new().unwrap();
        let cfg    = fixture(&tmp);
        let text   = fs::read_to_string(&cfg.test_file).unwrap().replace(r#""label":0"#, r#""label":1"#);
        fs::write(&cfg.test_file, text).unwrap();
        let device = Default::default();

        let summary = TestUseCase::new(cfg.clone()).execute::<TestBackend>(&device).unwrap();

        assert_eq!(summary.report.auc, None);
        assert!(summary.report.to_string().ends_with("AUC n/a"));

        let predictions = fs::read_to_string(&summary.predictions_path).unwrap();
        assert_eq!(predictions.lines().count(), 5);
        for line in predictions.lines() {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(v["labels"], 1);
        }

        let history = fs::read_to_string(cfg.save_dir().join("metrics.csv")).unwrap();
        let row     = history.lines().nth(1).unwrap();
        assert!(row.ends_with(','), "auc field should be empty: {row}");
    }

    #[test]
    fn test_empty_vocabulary_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let cfg = fixture(&tmp);
        fs::write(&cfg.word2vec_file, "0 2\n").unwrap();
        let device = Default::default();

        let err = TestUseCase::new(cfg).execute::<TestBackend>(&device).err().unwrap();
        assert!(err.to_string().contains("has no words"));
    }

    #[test]
    fn test_empty_test_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let cfg = fixture(&tmp);
        fs::write(&cfg.test_file, "\n").unwrap();
        let device = Default::default();

        assert!(TestUseCase::new(cfg).execute::<TestBackend>(&device).is_err());
    }
}
