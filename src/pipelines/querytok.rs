//! Query tokenization pipeline.
//!
//! Query files are small, so tokenization is sequential and per-record:
//! no chunking, no batching. Each run handles one query set (train or
//! dev); the two runs are independent.
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{Config, Step};
use crate::error::Error;
use crate::io::reader::QueryRecord;
use crate::tokenization::{normalized_text, BertWordPiece};

use super::pipeline::Pipeline;

/// Which query file to tokenize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySet {
    Train,
    Dev,
}

impl QuerySet {
    pub fn name(&self) -> &'static str {
        match self {
            QuerySet::Train => "train",
            QuerySet::Dev => "dev",
        }
    }

    fn step(&self) -> Step {
        match self {
            QuerySet::Train => Step::TrainQueryTokenizer,
            QuerySet::Dev => Step::DevQueryTokenizer,
        }
    }

    fn src(&self, config: &Config) -> PathBuf {
        match self {
            QuerySet::Train => config.train_queries_path(),
            QuerySet::Dev => config.dev_queries_path(),
        }
    }

    fn expected(&self, config: &Config) -> u64 {
        match self {
            QuerySet::Train => config.train_queries,
            QuerySet::Dev => config.full_dev_queries,
        }
    }
}

pub struct QueryTokenizer {
    config: Config,
    set: QuerySet,
}

impl QueryTokenizer {
    pub fn new(config: &Config, set: QuerySet) -> Self {
        Self {
            config: config.clone(),
            set,
        }
    }
}

impl Pipeline<()> for QueryTokenizer {
    fn run(&self) -> Result<(), Error> {
        let src = self.set.src(&self.config);
        if !src.is_file() {
            return Err(Error::Config(format!(
                "{} queries not found at {:?}",
                self.set.name(),
                src
            )));
        }

        let tokenized_path = append_extension(&src, "tokenized");
        let bert_path = append_extension(&src, "bert");
        if tokenized_path.is_file()
            && bert_path.is_file()
            && !self.config.force(self.set.step())
        {
            info!(
                "already found tokenized {} queries at {:?}",
                self.set.name(),
                src
            );
            return Ok(());
        }

        info!("tokenizing {} queries", self.set.name());
        let tokenizer = BertWordPiece::from_vocab(
            &self.config.tokenizer_vocab_path,
            self.config.lowercase(),
        )?;
        let expected = self.set.expected(&self.config);

        let reader = BufReader::new(File::open(&src)?);
        let mut outf = BufWriter::new(File::create(&tokenized_path)?);
        let mut bertf = BufWriter::new(File::create(&bert_path)?);
        let mut done: u64 = 0;
        for line in reader.lines() {
            let line = line?;
            let record = match QueryRecord::parse(&line) {
                Some(record) => record,
                None => {
                    debug!("dropping malformed {} query line", self.set.name());
                    continue;
                }
            };
            let tokens = tokenizer.encode(&record.text)?;
            writeln!(bertf, "{}\t{}", record.query_id, tokens.join(" "))?;
            writeln!(outf, "{}\t{}", record.query_id, normalized_text(&tokens))?;
            done += 1;
            if done % 50_000 == 0 {
                info!(
                    "tokenized {}/{} {} queries",
                    done,
                    expected,
                    self.set.name()
                );
            }
        }
        outf.flush()?;
        bertf.flush()?;

        info!("tokenized {} {} queries", done, self.set.name());
        Ok(())
    }
}

/// `queries.tsv` -> `queries.tsv.tokenized`
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_appended_not_replaced() {
        assert_eq!(
            append_extension(Path::new("/data/queries.tsv"), "tokenized"),
            PathBuf::from("/data/queries.tsv.tokenized")
        );
        assert_eq!(
            append_extension(Path::new("/data/queries.tsv"), "bert"),
            PathBuf::from("/data/queries.tsv.bert")
        );
    }
}
