// ============================================================
// Layer 4 — Word2Vec Vocabulary
// ============================================================
// Reads a word-embedding file in the word2vec text format:
//
//   3 4                    ← header: <word count> <vector size>
//   the 0.1 0.2 0.3 0.4
//   rice 0.5 0.1 0.0 0.2
//   cook 0.9 0.3 0.1 0.7
//
// A word's token id is its zero-based position in the file,
// so "the" → 0, "rice" → 1, "cook" → 2. The same ordering was
// used to build the model's embedding matrix, which is why the
// vectors themselves are only validated, not kept: the trained
// weights already live in the checkpoint.
//
// Reference: Mikolov et al. (2013) word2vec
//            Rust Book §8 (Hash Maps)

use anyhow::{anyhow, bail, Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Word → token id lookup built from a word2vec file.
#[derive(Debug, Clone, Default)]
pub struct Word2VecVocab {
    index:       HashMap<String, u32>,
    vector_size: usize,
}

impl Word2VecVocab {
    /// Load the vocabulary from a word2vec text file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Cannot open word2vec file '{}'", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid word2vec file '{}'", path.display()))
    }

    /// Parse the word2vec text format from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        // ── Header: "<count> <dim>" ───────────────────────────────────────────
        let header = lines
            .next()
            .ok_or_else(|| anyhow!("empty file, expected '<count> <dim>' header"))??;
        let mut parts = header.split_whitespace();
        let count: usize = parts
            .next()
            .ok_or_else(|| anyhow!("missing word count in header"))?
            .parse()
            .context("word count in header is not an integer")?;
        let vector_size: usize = parts
            .next()
            .ok_or_else(|| anyhow!("missing vector size in header"))?
            .parse()
            .context("vector size in header is not an integer")?;

        // ── One word per line ─────────────────────────────────────────────────
        let mut index = HashMap::with_capacity(count);
        let mut next_id = 0u32;
        for (n, line) in lines.enumerate() {
            let line    = line?;
            let line_no = n + 2;
            let mut fields = line.split_whitespace();
            let word = match fields.next() {
                Some(w) => w,
                None    => continue,
            };

            let mut width = 0;
            for value in fields {
                value.parse::<f32>().with_context(|| {
                    format!("line {line_no}: '{value}' is not a number")
                })?;
                width += 1;
            }
            if width != vector_size {
                bail!("line {line_no}: expected {vector_size} values for '{word}', found {width}");
            }

            // First occurrence wins; the id still advances so later
            // words keep their positional id.
            index.entry(word.to_string()).or_insert(next_id);
            next_id += 1;
        }

        if next_id as usize != count {
            tracing::warn!(
                "word2vec header declares {} words but {} were read",
                count,
                next_id
            );
        }

        Ok(Self { index, vector_size })
    }

    /// Token id of a word, or None when it is out of vocabulary.
    pub fn id(&self, word: &str) -> Option<u32> {
        self.index.get(word).copied()
    }

    /// Token ids for a sequence of words; unknown words map to 0.
    pub fn to_ids<S: AsRef<str>>(&self, words: &[S]) -> Vec<u32> {
        words
            .iter()
            .map(|w| self.id(w.as_ref()).unwrap_or(0))
            .collect()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// One past the largest token id this vocabulary can produce.
    pub fn id_bound(&self) -> usize {
        self.index.values().max().map(|m| *m as usize + 1).unwrap_or(0)
    }

    pub fn vector_size(&self) -> usize {
        self.vector_size
    }
}
