//! Tokenization of a single corpus chunk.
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::time::Instant;

use log::{debug, info};

use crate::error::Error;
use crate::io::reader::DocRecord;
use crate::io::writer::PartialFiles;
use crate::tokenization::{normalized_text, strip_boundaries, BertWordPiece};

/// Tokenize one chunk: seek to `offset`, read at most `no_lines` lines,
/// batch-tokenize them, and write the three partial files for `chunk`
/// under `tmp_dir`.
///
/// Never reads past `no_lines` records, so chunks stay disjoint by
/// construction; only the trailing chunk may run short on EOF. Records
/// that do not split into exactly four fields are dropped. Returns the
/// number of documents written.
pub fn process_chunk(
    chunk: usize,
    offset: u64,
    no_lines: u64,
    tokenizer: &BertWordPiece,
    docs_path: &Path,
    tmp_dir: &Path,
) -> Result<usize, Error> {
    let mut f = File::open(docs_path)?;
    f.seek(SeekFrom::Start(offset))?;
    let mut reader = BufReader::new(f);

    let mut doc_ids = Vec::new();
    let mut texts = Vec::new();
    let mut line = String::new();
    for _ in 0..no_lines {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        match DocRecord::parse(&line) {
            Some(record) => {
                texts.push(record.text());
                doc_ids.push(record.doc_id);
            }
            None => debug!("chunk {}: dropping malformed record", chunk),
        }
    }

    info!("chunk {}: tokenizing {} documents", chunk, doc_ids.len());
    let start = Instant::now();
    let tokenized = tokenizer.encode_batch(texts)?;
    info!(
        "chunk {}: tokenizer finished in {:?}",
        chunk,
        start.elapsed()
    );

    let mut partials = PartialFiles::create(tmp_dir, chunk)?;
    for (doc_id, tokens) in doc_ids.iter().zip(&tokenized) {
        let tokens = strip_boundaries(tokens);
        partials.write(doc_id, &normalized_text(tokens), tokens)?;
    }
    partials.finish()?;

    Ok(doc_ids.len())
}
