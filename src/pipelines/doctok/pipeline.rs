//! Document tokenization pipeline.
//!
//! # Processing
//! 1. Short-circuit when the final tokenized TSV already exists and the
//!    step is not forced.
//! 1. Obtain the offset table (load the persisted one, or scan and persist).
//! 1. Tokenize every chunk on a worker pool bounded by the configured
//!    worker count. Workers share no mutable state: each owns a disjoint
//!    byte range of the corpus and its own partial files.
//! 1. Merge partial files into the final files, in chunk order. Merging
//!    only starts once every chunk has succeeded.
use std::fs;

use glob::glob;
use log::{error, info, warn};
use rayon::prelude::*;

use crate::config::{Config, Step};
use crate::error::Error;
use crate::io::writer::{merge_partials, OutputForm};
use crate::pipelines::pipeline::Pipeline;
use crate::tokenization::BertWordPiece;

use super::chunk::process_chunk;
use super::offsets::{lines_per_chunk, OffsetTable};

pub struct DocTokenizer {
    config: Config,
}

impl DocTokenizer {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Load the persisted offset table for the configured worker count,
    /// or scan the corpus and persist the result. Either way the table is
    /// validated against the current corpus before use.
    fn offset_table(&self, lines: u64) -> Result<OffsetTable, Error> {
        let table = if self.config.number_of_cpus < 2 {
            OffsetTable::single()
        } else {
            let path = self.config.offsets_path();
            if path.is_file() {
                info!("loading offset table from {:?}", path);
                OffsetTable::load(&path)?
            } else {
                info!("scanning {:?} for chunk offsets", self.config.docs_path());
                let table = OffsetTable::scan(
                    &self.config.docs_path(),
                    lines,
                    self.config.number_of_cpus,
                )?;
                table.save(&path)?;
                table
            }
        };

        let corpus_bytes = fs::metadata(self.config.docs_path())?.len();
        table.validate(self.config.number_of_cpus, corpus_bytes)?;
        Ok(table)
    }

    /// Remove partial files left behind by a crashed earlier run, so a
    /// reprocessed chunk never merges stale data.
    fn clean_stale_partials(&self) -> Result<(), Error> {
        let tmp = self.config.tmp_dir();
        for pattern in ["docs-*", "trec_docs-*"] {
            let pattern = tmp.join(pattern);
            let pattern = pattern
                .to_str()
                .ok_or_else(|| Error::Config(format!("non-UTF8 tmp path: {:?}", pattern)))?
                .to_string();
            for entry in glob(&pattern)? {
                let path = entry?;
                warn!("removing stale partial file {:?}", path);
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

impl Pipeline<()> for DocTokenizer {
    fn run(&self) -> Result<(), Error> {
        let config = &self.config;

        let final_tsv = OutputForm::Tsv.final_path(&config.docs_dir());
        if final_tsv.is_file() && !config.force(Step::DocTokenizer) {
            info!("tokenized docs already found at {:?}, skipping", final_tsv);
            return Ok(());
        }

        let docs_path = config.docs_path();
        if !docs_path.is_file() {
            return Err(Error::Config(format!(
                "could not find documents file at {:?}",
                docs_path
            )));
        }
        if !config.tokenizer_vocab_path.is_file() {
            return Err(Error::Config(format!(
                "could not find vocabulary file at {:?}",
                config.tokenizer_vocab_path
            )));
        }

        let tmp = config.tmp_dir();
        if !tmp.is_dir() {
            fs::create_dir_all(&tmp)?;
        }
        self.clean_stale_partials()?;

        let lines = lines_per_chunk(config.corpus_size, config.number_of_cpus)?;
        info!("number of lines per chunk: {}", lines);
        let offsets = self.offset_table(lines)?;

        let tokenizer =
            BertWordPiece::from_vocab(&config.tokenizer_vocab_path, config.lowercase())?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.number_of_cpus)
            .build()?;
        let errors: Vec<Error> = pool.install(|| {
            (0..config.number_of_cpus)
                .into_par_iter()
                .map(|chunk| {
                    let offset = offsets.offset(chunk)?;
                    let written =
                        process_chunk(chunk, offset, lines, &tokenizer, &docs_path, &tmp)?;
                    info!("chunk {}: {} documents", chunk, written);
                    Ok(())
                })
                .filter_map(|res: Result<(), Error>| res.err())
                .collect()
        });

        // hard merge barrier: a single failed chunk would corrupt merge
        // ordering, so nothing is merged.
        if !errors.is_empty() {
            for e in &errors {
                error!("{:?}", e);
            }
            return Err(Error::Custom(format!(
                "{} chunk(s) failed, aborting before merge",
                errors.len()
            )));
        }

        for form in OutputForm::ALL {
            info!("merging {} partial files", form.final_name());
            merge_partials(&tmp, &config.docs_dir(), form, config.number_of_cpus)?;
        }
        info!("tokenized docs written to {:?}", config.docs_dir());
        Ok(())
    }
}
