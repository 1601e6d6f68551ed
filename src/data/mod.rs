// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between text files on disk and tensor batches.
//
//   embedding file            dataset .tsv files
//       │                           │
//       ▼                           ▼
//   EmbeddingTable            TsvPairLoader      → Vec<SentencePair>
//       │                           │
//       └────────────┬──────────────┘
//                    ▼
//              PairEncoder           → fixed-length index rows
//                    │
//                    ▼
//              NliDataset            → Burn Dataset trait
//                    │
//                    ▼
//              NliBatcher            → index → vector expansion,
//                    │                 padding masks, labels
//                    ▼
//              DataLoader            → batches for the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Pretrained word vectors (word → dense vector)
pub mod embeddings;

/// Reads label<TAB>premise<TAB>hypothesis files
pub mod loader;

/// Pads/truncates and concatenates sentence pairs
pub mod encoder;

/// Implements Burn's Dataset trait for encoded pairs
pub mod dataset;

/// Implements Burn's Batcher trait, expanding indices into embeddings
pub mod batcher;

/// Seeded train/dev split
pub mod splitter;
