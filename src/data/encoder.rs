// ============================================================
// Layer 4 — Fixed-Length Pair Encoder
// ============================================================
// Turns a SentencePair into one fixed-length row of embedding
// indices so every sample in a batch has the same shape.
//
// Layout of a row (max_len = 4):
//
//   premise    "a cat sleeps"      → [ 7, 12, 40,  0]
//   hypothesis "an animal rests"   → [ 9, 31, 55,  0]
//   row                            → [ 7, 12, 40, 0, 9, 31, 55, 0]
//
// Each sentence is truncated to max_len, right-padded with the
// padding index, and the two halves are concatenated. The real
// (post-truncation) lengths ride along so the batcher can mask
// padding positions.

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::dataset::NliSample;
use crate::data::embeddings::{EmbeddingTable, PAD_INDEX};
use crate::domain::sentence_pair::SentencePair;

/// What to do with tokens missing from the embedding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownWordPolicy {
    /// Fail, naming the token
    #[default]
    Error,
    /// Map the token to the padding vector
    Pad,
}

#[derive(Debug, Clone)]
pub struct PairEncoder {
    max_len: usize,
    unknown: UnknownWordPolicy,
}

impl PairEncoder {
    pub fn new(max_len: usize, unknown: UnknownWordPolicy) -> Self {
        Self { max_len, unknown }
    }

    /// Encode one pair into a row of 2 * max_len indices.
    /// An empty premise or hypothesis is an error: it would be fully masked.
    pub fn encode(&self, table: &EmbeddingTable, pair: &SentencePair) -> Result<NliSample> {
        if pair.premise.is_empty() || pair.hypothesis.is_empty() {
            bail!("empty sentence");
        }
        let premise    = self.encode_sentence(table, &pair.premise)?;
        let hypothesis = self.encode_sentence(table, &pair.hypothesis)?;

        let mut token_ids = Vec::with_capacity(2 * self.max_len);
        token_ids.extend(pad_to(&premise, self.max_len));
        token_ids.extend(pad_to(&hypothesis, self.max_len));

        Ok(NliSample {
            token_ids,
            premise_len:    premise.len(),
            hypothesis_len: hypothesis.len(),
            label:          pair.label,
        })
    }

    /// Encode a whole dataset, logging how many sentences were cut.
    pub fn encode_all(&self, table: &EmbeddingTable, pairs: &[SentencePair]) -> Result<Vec<NliSample>> {
        let truncated = pairs.iter().filter(|p| p.max_len() > self.max_len).count();
        if truncated > 0 {
            tracing::warn!(
                "{truncated} of {} pairs exceed max_len={} and were truncated",
                pairs.len(),
                self.max_len
            );
        }

        pairs.iter().map(|p| self.encode(table, p)).collect()
    }

    fn encode_sentence(&self, table: &EmbeddingTable, tokens: &[String]) -> Result<Vec<u32>> {
        tokens
            .iter()
            .take(self.max_len)
            .map(|tok| match (table.index_of(tok), self.unknown) {
                (Some(idx), _) => Ok(idx),
                (None, UnknownWordPolicy::Pad) => Ok(PAD_INDEX),
                (None, UnknownWordPolicy::Error) => {
                    Err(anyhow!("Word '{tok}' is not in the embedding table"))
                }
            })
            .collect()
    }
}

fn pad_to(ids: &[u32], len: usize) -> impl Iterator<Item = u32> + '_ {
    ids.iter()
        .copied()
        .chain(std::iter::repeat(PAD_INDEX))
        .take(len)
}
