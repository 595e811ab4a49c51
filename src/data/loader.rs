// ============================================================
// Layer 4 — Test Set Loader
// ============================================================
// Loads the held-out test set from a JSON-lines file. Each
// line is one labelled text pair whose texts are already split
// into words:
//
//   {"front_testid": "q1", "behind_testid": "q2",
//    "front_features": ["how", "to", "cook", "rice"],
//    "behind_features": ["how", "to", "boil", "rice"],
//    "label": 1}
//
// Words are mapped to token ids through the word2vec
// vocabulary (unknown words → 0) and the label is expanded to
// a one-hot vector with one entry per class.
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use crate::data::embedding::Word2VecVocab;
use crate::domain::example::{one_hot, TestExample, TestSet};
use crate::domain::traits::ExampleSource;

/// One raw line of the test file, before token mapping.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(alias = "front_id")]
    front_testid:    String,
    #[serde(alias = "behind_id")]
    behind_testid:   String,
    front_features:  Vec<String>,
    behind_features: Vec<String>,
    label:           usize,
}

/// Loads a JSON-lines test file.
/// Implements the ExampleSource trait from Layer 3.
pub struct JsonLinesLoader<'a> {
    path:        PathBuf,
    vocab:       &'a Word2VecVocab,
    num_classes: usize,
}

impl<'a> JsonLinesLoader<'a> {
    pub fn new(path: impl Into<PathBuf>, vocab: &'a Word2VecVocab, num_classes: usize) -> Self {
        Self { path: path.into(), vocab, num_classes }
    }

    /// Convert one parsed line into a domain example.
    fn to_example(&self, raw: RawRecord) -> Result<TestExample> {
        let label = one_hot(raw.label, self.num_classes).ok_or_else(|| {
            anyhow!(
                "label {} is out of range for {} classes",
                raw.label,
                self.num_classes
            )
        })?;

        Ok(TestExample {
            front_id:      raw.front_testid,
            behind_id:     raw.behind_testid,
            front_tokens:  self.vocab.to_ids(&raw.front_features),
            behind_tokens: self.vocab.to_ids(&raw.behind_features),
            label,
        })
    }
}

impl ExampleSource for JsonLinesLoader<'_> {
    fn load_all(&self) -> Result<TestSet> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open test file '{}'", self.path.display()))?;

        let mut examples = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            // Trailing newlines and blank separators are common in dumps
            if line.trim().is_empty() {
                continue;
            }

            let raw: RawRecord = serde_json::from_str(&line).with_context(|| {
                format!("{}:{}: malformed record", self.path.display(), n + 1)
            })?;
            let example = self
                .to_example(raw)
                .with_context(|| format!("{}:{}", self.path.display(), n + 1))?;
            examples.push(example);
        }

        tracing::debug!(
            "Read {} examples from '{}'",
            examples.len(),
            self.path.display()
        );
        Ok(TestSet::new(examples))
    }
}
