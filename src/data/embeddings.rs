// ============================================================
// Layer 4 — Embedding Table Loader
// ============================================================
// Loads pretrained word vectors (GloVe / fastText / word2vec
// text format) into memory once at startup.
//
// File format, one word per line:
//   the 0.418 0.24968 -0.41242 ...
//   ,   0.013441 0.23682 -0.16899 ...
//
// Storage layout:
//   All vectors live in one flat row-major Vec<f32>, so row i
//   is data[i*dim .. (i+1)*dim]. Row 0 is reserved for padding
//   and is always the zero vector; the first word in the file
//   gets index 1, the second index 2, and so on.
//
// The batcher reads rows straight out of this table when it
// expands token indices into embedding tensors.

use anyhow::{bail, Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Index used for padding positions (zero vector).
pub const PAD_INDEX: u32 = 0;

#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    word_to_index: HashMap<String, u32>,
    data:          Vec<f32>,
    dim:           usize,
}

impl EmbeddingTable {
    /// Load an embedding table from a text file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Cannot open embedding file '{}'", path.display()))?;
        let table = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid embedding file '{}'", path.display()))?;

        tracing::info!(
            "Loaded {} word vectors of dimension {} from '{}'",
            table.vocab_size(),
            table.dim,
            path.display()
        );
        Ok(table)
    }

    /// Parse an embedding table from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut word_to_index = HashMap::new();
        let mut data: Vec<f32> = Vec::new();
        let mut dim = 0usize;
        let mut duplicates = 0usize;
        let mut seen_vector_line = false;

        for (line_no, line) in reader.lines().enumerate() {
            let line_no = line_no + 1;
            let line = line.with_context(|| format!("Cannot read line {line_no}"))?;
            let mut parts = line.split_whitespace();

            let Some(word) = parts.next() else { continue };
            let values: Vec<&str> = parts.collect();

            // word2vec text files start with "<count> <dim>"
            if !seen_vector_line && is_word2vec_header(word, &values) {
                tracing::debug!("Skipping word2vec header on line {line_no}");
                continue;
            }
            seen_vector_line = true;

            if values.is_empty() {
                bail!("Line {line_no}: word '{word}' has no vector components");
            }
            if dim == 0 {
                dim = values.len();
                // Row 0: padding
                data.resize(dim, 0.0);
            } else if values.len() != dim {
                bail!(
                    "Line {line_no}: expected {dim} components for '{word}', found {}",
                    values.len()
                );
            }

            if word_to_index.contains_key(word) {
                duplicates += 1;
                continue;
            }

            for v in &values {
                let x: f32 = v.parse().with_context(|| {
                    format!("Line {line_no}: component '{v}' of '{word}' is not a number")
                })?;
                data.push(x);
            }
            let index = (data.len() / dim - 1) as u32;
            word_to_index.insert(word.to_string(), index);
        }

        if word_to_index.is_empty() {
            bail!("Embedding file contains no vectors");
        }
        if duplicates > 0 {
            tracing::warn!("Ignored {duplicates} duplicate words (first occurrence kept)");
        }

        Ok(Self { word_to_index, data, dim })
    }

    /// Index of a word, or None if it is out of vocabulary.
    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.word_to_index.get(word).copied()
    }

    /// Embedding row for an index. Out-of-range indices yield the
    /// padding row.
    pub fn vector(&self, index: u32) -> &[f32] {
        let start = index as usize * self.dim;
        match self.data.get(start..start + self.dim) {
            Some(row) => row,
            None => &self.data[..self.dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows including the padding row.
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.word_to_index.is_empty()
    }

    /// Number of real words (excludes padding).
    pub fn vocab_size(&self) -> usize {
        self.word_to_index.len()
    }
}

fn is_word2vec_header(first: &str, rest: &[&str]) -> bool {
    rest.len() == 1 && first.parse::<usize>().is_ok() && rest[0].parse::<usize>().is_ok()
}
