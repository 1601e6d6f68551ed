// ============================================================
// Layer 4 — Sentence-Pair Loader
// ============================================================
// Reads NLI datasets stored as tab-separated text:
//
//   label<TAB>premise tokens<TAB>hypothesis tokens
//   0	A man plays a guitar .	A person makes music .
//   2	A man plays a guitar .	Nobody is playing .
//
// Sentences are already tokenised; tokens are separated by
// spaces. Every malformed line is a hard error naming the file
// and line number, since silently dropping examples changes
// what the model is evaluated on.

use anyhow::{bail, Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use crate::domain::sentence_pair::SentencePair;
use crate::domain::traits::PairSource;

/// Loads labelled sentence pairs from one TSV file.
pub struct TsvPairLoader {
    path:        PathBuf,
    num_classes: usize,
}

impl TsvPairLoader {
    pub fn new(path: impl Into<PathBuf>, num_classes: usize) -> Self {
        Self { path: path.into(), num_classes }
    }
}

impl PairSource for TsvPairLoader {
    fn load_all(&self) -> Result<Vec<SentencePair>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;
        let pairs = parse_pairs(BufReader::new(file), self.num_classes)
            .with_context(|| format!("Invalid dataset '{}'", self.path.display()))?;

        tracing::info!("Loaded {} sentence pairs from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}

/// Parse TSV sentence pairs from a reader.
pub fn parse_pairs<R: BufRead>(reader: R, num_classes: usize) -> Result<Vec<SentencePair>> {
    let mut pairs = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("Cannot read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        pairs.push(parse_line(&line, line_no, num_classes)?);
    }

    Ok(pairs)
}

fn parse_line(line: &str, line_no: usize, num_classes: usize) -> Result<SentencePair> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        bail!("Line {line_no}: expected 3 tab-separated fields, found {}", fields.len());
    }

    let label: usize = fields[0]
        .trim()
        .parse()
        .with_context(|| format!("Line {line_no}: label '{}' is not a class index", fields[0]))?;
    if label >= num_classes {
        bail!("Line {line_no}: label {label} out of range for {num_classes} classes");
    }

    let pair = SentencePair::from_text(label, fields[1], fields[2]);
    if pair.premise.is_empty() || pair.hypothesis.is_empty() {
        bail!("Line {line_no}: empty sentence");
    }
    Ok(pair)
}
