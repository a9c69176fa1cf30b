//! Pipeline configuration.
//!
//! A single immutable [Config] is built once (usually from CLI arguments)
//! and passed by reference into each pipeline step.
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

/// Pipeline steps that can be forced to re-run even if their outputs
/// are already present on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    DocTokenizer,
    TrainQueryTokenizer,
    DevQueryTokenizer,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doc_tokenizer" => Ok(Step::DocTokenizer),
            "train_query_tokenizer" => Ok(Step::TrainQueryTokenizer),
            "dev_query_tokenizer" => Ok(Step::DevQueryTokenizer),
            other => Err(format!(
                "unknown step {:?} (expected doc_tokenizer, train_query_tokenizer or dev_query_tokenizer)",
                other
            )),
        }
    }
}

/// Shared configuration for all pipeline steps.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root data directory. Corpus, queries and outputs live under it.
    pub data_home: PathBuf,
    /// Steps to re-run even when their outputs already exist.
    pub force_steps: HashSet<Step>,
    /// Worker count, which is also the chunk count for document tokenization.
    pub number_of_cpus: usize,
    /// Total record count of the document corpus.
    pub corpus_size: u64,
    /// Expected train query count. Progress reporting only.
    pub train_queries: u64,
    /// Expected dev query count. Progress reporting only.
    pub full_dev_queries: u64,
    /// WordPiece vocabulary file.
    pub tokenizer_vocab_path: PathBuf,
    /// Model family identifier, e.g. `distilbert-base-uncased`.
    /// Determines the case-folding policy.
    pub bert_class: String,
}

impl Config {
    pub fn force(&self, step: Step) -> bool {
        self.force_steps.contains(&step)
    }

    /// Uncased model families get lowercased input.
    pub fn lowercase(&self) -> bool {
        self.bert_class.contains("uncased")
    }

    pub fn docs_path(&self) -> PathBuf {
        self.data_home.join("docs").join("msmarco-docs.tsv")
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.data_home.join("docs")
    }

    /// Scratch directory holding per-chunk partial files.
    pub fn tmp_dir(&self) -> PathBuf {
        self.data_home.join("tmp")
    }

    /// Offset table location. One file per distinct worker count.
    pub fn offsets_path(&self) -> PathBuf {
        self.data_home
            .join(format!("block_offset_{}.json", self.number_of_cpus))
    }

    pub fn train_queries_path(&self) -> PathBuf {
        self.data_home
            .join("queries")
            .join("msmarco-doctrain-queries.tsv")
    }

    pub fn dev_queries_path(&self) -> PathBuf {
        self.data_home
            .join("queries")
            .join("msmarco-docdev-queries.tsv")
    }
}
