//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use marcoprep::config::{Config, Step};

#[derive(Debug, StructOpt)]
#[structopt(name = "marcoprep", about = "MS MARCO document ranking data preparation.")]
/// Holds every command that is callable by the `marcoprep` command.
pub enum MarcoPrep {
    #[structopt(about = "Tokenize the document corpus")]
    Docs(Opts),
    #[structopt(about = "Tokenize the train and dev query files")]
    Queries(Opts),
    #[structopt(about = "Run every tokenization step")]
    All(Opts),
}

#[derive(Debug, StructOpt)]
/// Shared options covering the whole configuration surface.
pub struct Opts {
    #[structopt(parse(from_os_str), help = "root data directory")]
    pub data_home: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "vocab",
        help = "path to the WordPiece vocabulary file"
    )]
    pub vocab: PathBuf,
    #[structopt(
        long = "bert-class",
        default_value = "distilbert-base-uncased",
        help = "model family identifier, determines the casing policy"
    )]
    pub bert_class: String,
    #[structopt(
        long = "cpus",
        help = "worker count. Defaults to the number of logical cores."
    )]
    pub cpus: Option<usize>,
    #[structopt(
        long = "corpus-size",
        default_value = "3213835",
        help = "number of records in the document corpus"
    )]
    pub corpus_size: u64,
    #[structopt(
        long = "train-queries",
        default_value = "367013",
        help = "expected train query count (progress reporting only)"
    )]
    pub train_queries: u64,
    #[structopt(
        long = "dev-queries",
        default_value = "5193",
        help = "expected dev query count (progress reporting only)"
    )]
    pub dev_queries: u64,
    #[structopt(
        long = "force",
        help = "steps to re-run even if their outputs exist \
                (doc_tokenizer, train_query_tokenizer, dev_query_tokenizer)"
    )]
    pub force_steps: Vec<Step>,
}

impl Opts {
    pub fn into_config(self) -> Config {
        Config {
            data_home: self.data_home,
            force_steps: self.force_steps.into_iter().collect(),
            number_of_cpus: self.cpus.unwrap_or_else(rayon::current_num_threads),
            corpus_size: self.corpus_size,
            train_queries: self.train_queries,
            full_dev_queries: self.dev_queries,
            tokenizer_vocab_path: self.vocab,
            bert_class: self.bert_class,
        }
    }
}
