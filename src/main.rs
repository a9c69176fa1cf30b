//! # marcoprep
//!
//! Data preparation pipeline for the MS MARCO document ranking task:
//! tokenizes the document corpus (in parallel chunks) and the query files
//! with a WordPiece tokenizer, producing the TSV/TREC/raw-token artifacts
//! consumed by the retrieval and training steps.
//!
//! ## Getting started
//!
//! ```sh
//! marcoprep 0.2.0
//! MS MARCO document ranking data preparation.
//!
//! USAGE:
//!     marcoprep <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     all        Run every tokenization step
//!     docs       Tokenize the document corpus
//!     help       Prints this message or the help of the given subcommand(s)
//!     queries    Tokenize the train and dev query files
//! ```
//!
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

use marcoprep::error::Error;
use marcoprep::pipelines::{DocTokenizer, Pipeline, QuerySet, QueryTokenizer};

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::MarcoPrep::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::MarcoPrep::Docs(opts) => {
            let config = opts.into_config();
            DocTokenizer::new(&config).run()?;
        }
        cli::MarcoPrep::Queries(opts) => {
            let config = opts.into_config();
            QueryTokenizer::new(&config, QuerySet::Train).run()?;
            QueryTokenizer::new(&config, QuerySet::Dev).run()?;
        }
        cli::MarcoPrep::All(opts) => {
            let config = opts.into_config();
            QueryTokenizer::new(&config, QuerySet::Train).run()?;
            QueryTokenizer::new(&config, QuerySet::Dev).run()?;
            DocTokenizer::new(&config).run()?;
        }
    };
    Ok(())
}
