//! Partial and final file writing for the document tokenization pipeline.
//!
//! Each chunk writes three partial files (one per output form), owned by
//! exactly one writer and flushed before the merge phase reads them. The
//! merge streams partials into the final files in ascending chunk order,
//! which is what reconstructs the original corpus order out of
//! out-of-order-completing workers.
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Error;

/// The three output forms produced for every tokenized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputForm {
    /// `doc_id\tnormalized_text`
    Tsv,
    /// `<DOC>`-wrapped markup blocks, for indexing by the retrieval engine.
    Trec,
    /// `doc_id\traw sub-word tokens`, continuation markers included.
    Bert,
}

impl OutputForm {
    pub const ALL: [OutputForm; 3] = [OutputForm::Tsv, OutputForm::Trec, OutputForm::Bert];

    /// Partial file name for a given chunk.
    pub fn partial_name(&self, chunk: usize) -> String {
        match self {
            OutputForm::Tsv => format!("docs-{}", chunk),
            OutputForm::Trec => format!("trec_docs-{}", chunk),
            OutputForm::Bert => format!("docs-{}.bert", chunk),
        }
    }

    /// Final merged file name.
    pub fn final_name(&self) -> &'static str {
        match self {
            OutputForm::Tsv => "msmarco-docs.tokenized.tsv",
            OutputForm::Trec => "msmarco-docs.tokenized.trec",
            OutputForm::Bert => "msmarco-docs.tokenized.bert",
        }
    }

    pub fn partial_path(&self, tmp: &Path, chunk: usize) -> PathBuf {
        tmp.join(self.partial_name(chunk))
    }

    pub fn final_path(&self, docs_dir: &Path) -> PathBuf {
        docs_dir.join(self.final_name())
    }
}

/// The three partial files of one chunk. Created truncating, so a
/// reprocessed chunk never appends to a leftover file.
pub struct PartialFiles {
    tsv: BufWriter<File>,
    trec: BufWriter<File>,
    bert: BufWriter<File>,
}

impl PartialFiles {
    pub fn create(tmp: &Path, chunk: usize) -> Result<Self, Error> {
        Ok(PartialFiles {
            tsv: BufWriter::new(File::create(OutputForm::Tsv.partial_path(tmp, chunk))?),
            trec: BufWriter::new(File::create(OutputForm::Trec.partial_path(tmp, chunk))?),
            bert: BufWriter::new(File::create(OutputForm::Bert.partial_path(tmp, chunk))?),
        })
    }

    /// Write one document to all three forms.
    pub fn write(&mut self, doc_id: &str, text: &str, tokens: &[String]) -> Result<(), Error> {
        writeln!(self.tsv, "{}\t{}", doc_id, text)?;
        writeln!(
            self.trec,
            "<DOC>\n<DOCNO>{}</DOCNO>\n<TEXT>{}</TEXT></DOC>",
            doc_id, text
        )?;
        writeln!(self.bert, "{}\t{}", doc_id, tokens.join(" "))?;
        Ok(())
    }

    /// Flush all three files. Has to be called before the merge reads them.
    pub fn finish(mut self) -> Result<(), Error> {
        self.tsv.flush()?;
        self.trec.flush()?;
        self.bert.flush()?;
        Ok(())
    }
}

/// Merge the partial files of `form` into its final file, in ascending
/// chunk order, deleting each partial once consumed.
///
/// On failure the incomplete final file is removed before the error is
/// propagated, so a crashed merge never leaves a truncated final file
/// that would short-circuit the next run.
pub fn merge_partials(
    tmp: &Path,
    docs_dir: &Path,
    form: OutputForm,
    n_chunks: usize,
) -> Result<(), Error> {
    let dst = form.final_path(docs_dir);
    match merge_into(&dst, tmp, form, n_chunks) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&dst);
            Err(e)
        }
    }
}

fn merge_into(dst: &Path, tmp: &Path, form: OutputForm, n_chunks: usize) -> Result<(), Error> {
    let mut out = BufWriter::new(File::create(dst)?);
    for chunk in 0..n_chunks {
        let partial = form.partial_path(tmp, chunk);
        debug!("merging {:?} into {:?}", partial, dst);
        let mut f = File::open(&partial)?;
        io::copy(&mut f, &mut out)?;
        fs::remove_file(&partial)?;
    }
    out.flush()?;
    Ok(())
}
