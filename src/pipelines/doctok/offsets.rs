//! Offset indexing for parallel chunk reads.
//!
//! One forward scan of the corpus records the byte offset of each chunk's
//! first record, so workers can seek straight to their chunk. The scan on
//! the full corpus is the single most expensive pass of the pipeline, so
//! the table is persisted per worker count and reused across runs.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of lines per chunk when splitting `corpus_size` records across
/// `workers` chunks.
///
/// When the worker count does not divide the corpus evenly, one chunk
/// absorbs the remainder: the divisor drops to `workers - 1` and the last
/// chunk picks up whatever is left. Configurations that cannot cover the
/// corpus (more workers than records, or a remainder larger than a chunk)
/// are fatal here, before any chunk work starts.
pub fn lines_per_chunk(corpus_size: u64, workers: usize) -> Result<u64, Error> {
    if workers == 0 {
        return Err(Error::Config("worker count must be at least 1".to_string()));
    }
    let workers = workers as u64;
    let divisor = if corpus_size % workers == 0 {
        workers
    } else {
        workers - 1
    };
    let lines = corpus_size / divisor;
    if lines == 0 || lines * workers < corpus_size {
        return Err(Error::Config(format!(
            "cannot split {} records across {} workers",
            corpus_size, workers
        )));
    }
    Ok(lines)
}

/// Byte offset of each chunk's first record, keyed by chunk index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetTable(BTreeMap<usize, u64>);

impl OffsetTable {
    /// Degenerate single-chunk table: chunk 0 starts at offset 0, no scan
    /// needed.
    pub fn single() -> Self {
        let mut table = BTreeMap::new();
        table.insert(0, 0);
        OffsetTable(table)
    }

    /// One forward scan of `docs`, recording the read position at every
    /// record index that is a multiple of `lines_per_chunk`.
    ///
    /// A trailing chunk start landing exactly on EOF (empty last chunk) is
    /// recorded too, but never past `workers` entries.
    pub fn scan(docs: &Path, lines_per_chunk: u64, workers: usize) -> Result<Self, Error> {
        let mut table = BTreeMap::new();
        let mut reader = BufReader::new(File::open(docs)?);
        let mut pos: u64 = 0;
        let mut records: u64 = 0;
        let mut line = String::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line)?;
            let at_eof = read == 0;
            // in-file chunk starts are recorded unconditionally, so a
            // corpus that outgrew its configured size fails validation
            // instead of silently losing its tail
            if records % lines_per_chunk == 0 && (!at_eof || table.len() < workers) {
                table.insert(table.len(), pos);
            }
            if at_eof {
                break;
            }
            pos += read as u64;
            records += 1;
            if records % 1_000_000 == 0 {
                debug!("offset scan: {} records", records);
            }
        }
        Ok(OffsetTable(table))
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let f = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(f))?)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let f = File::create(path)?;
        serde_json::to_writer(BufWriter::new(f), self)?;
        Ok(())
    }

    pub fn offset(&self, chunk: usize) -> Result<u64, Error> {
        self.0.get(&chunk).copied().ok_or_else(|| {
            Error::Config(format!("offset table has no entry for chunk {}", chunk))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hard invariants: exactly one entry per worker, contiguous 0-based
    /// chunk indices, strictly increasing offsets starting at 0, and no
    /// offset beyond the current corpus size (which catches a table that
    /// went stale because the corpus changed underneath it).
    pub fn validate(&self, workers: usize, corpus_bytes: u64) -> Result<(), Error> {
        if self.0.len() != workers {
            return Err(Error::Config(format!(
                "offset table has {} entries for {} workers",
                self.0.len(),
                workers
            )));
        }
        if !self.0.keys().copied().eq(0..workers) {
            return Err(Error::Config(
                "offset table chunk indices are not contiguous".to_string(),
            ));
        }
        if self.offset(0)? != 0 {
            return Err(Error::Config(
                "offset table does not start at offset 0".to_string(),
            ));
        }
        if !self.0.values().tuple_windows().all(|(a, b)| a < b) {
            return Err(Error::Config(
                "offset table offsets are not strictly increasing".to_string(),
            ));
        }
        if let Some(last) = self.0.values().next_back() {
            if *last > corpus_bytes {
                return Err(Error::Config(format!(
                    "offset {} lies beyond the corpus ({} bytes): stale offset table?",
                    last, corpus_bytes
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};

    fn write_corpus(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join("docs.tsv");
        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn numbered_corpus(dir: &Path, n: usize) -> (std::path::PathBuf, Vec<String>) {
        let lines: Vec<String> = (0..n).map(|i| format!("D{}\tu\tt\tbody {}", i, i)).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        (write_corpus(dir, &refs), lines)
    }

    /// Read `no_lines` lines starting at `offset`, the way a chunk worker
    /// does.
    fn read_chunk(path: &Path, offset: u64, no_lines: u64) -> Vec<String> {
        let mut f = File::open(path).unwrap();
        f.seek(SeekFrom::Start(offset)).unwrap();
        let mut s = String::new();
        f.read_to_string(&mut s).unwrap();
        s.lines().take(no_lines as usize).map(String::from).collect()
    }

    #[test]
    fn lines_per_chunk_formula() {
        // exact division: all workers get the same share
        assert_eq!(lines_per_chunk(12, 4).unwrap(), 3);
        assert_eq!(lines_per_chunk(10, 2).unwrap(), 5);
        // remainder: one chunk absorbs it
        assert_eq!(lines_per_chunk(10, 4).unwrap(), 3);
        assert_eq!(lines_per_chunk(10, 3).unwrap(), 5);
        // single worker reads everything
        assert_eq!(lines_per_chunk(10, 1).unwrap(), 10);
    }

    #[test]
    fn lines_per_chunk_rejects_uncoverable_configurations() {
        assert!(lines_per_chunk(10, 0).is_err());
        // lines_per_chunk would be 0
        assert!(lines_per_chunk(2, 4).is_err());
        // 4 chunks of 1 line cannot cover 5 records
        assert!(lines_per_chunk(5, 4).is_err());
        assert!(lines_per_chunk(0, 2).is_err());
    }

    #[test]
    fn scan_has_one_entry_per_worker() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = numbered_corpus(dir.path(), 10);
        let lines = lines_per_chunk(10, 4).unwrap();
        let table = OffsetTable::scan(&path, lines, 4).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.offset(0).unwrap(), 0);
        let size = std::fs::metadata(&path).unwrap().len();
        table.validate(4, size).unwrap();
    }

    #[test]
    fn scan_exact_division_does_not_overrun() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = numbered_corpus(dir.path(), 12);
        let lines = lines_per_chunk(12, 4).unwrap();
        let table = OffsetTable::scan(&path, lines, 4).unwrap();

        assert_eq!(table.len(), 4);
        let size = std::fs::metadata(&path).unwrap().len();
        table.validate(4, size).unwrap();
    }

    #[test]
    fn scan_records_empty_trailing_chunk_at_eof() {
        // 10 records, 3 workers: lines_per_chunk = 5, the third chunk is
        // empty and starts exactly at EOF.
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = numbered_corpus(dir.path(), 10);
        let lines = lines_per_chunk(10, 3).unwrap();
        let table = OffsetTable::scan(&path, lines, 3).unwrap();

        let size = std::fs::metadata(&path).unwrap().len();
        assert_eq!(table.len(), 3);
        assert_eq!(table.offset(2).unwrap(), size);
        table.validate(3, size).unwrap();
    }

    #[test]
    fn chunks_cover_the_corpus_exactly_once() {
        for (n, workers) in [(10, 4), (12, 4), (10, 3), (7, 2), (9, 9)] {
            let dir = tempfile::tempdir().unwrap();
            let (path, corpus) = numbered_corpus(dir.path(), n);
            let lines = lines_per_chunk(n as u64, workers).unwrap();
            let table = OffsetTable::scan(&path, lines, workers).unwrap();
            assert_eq!(table.len(), workers, "n={} workers={}", n, workers);

            let mut collected = Vec::new();
            for chunk in 0..workers {
                collected.extend(read_chunk(&path, table.offset(chunk).unwrap(), lines));
            }
            assert_eq!(collected, corpus, "n={} workers={}", n, workers);
        }
    }

    #[test]
    fn scan_detects_a_corpus_that_outgrew_its_configuration() {
        // configured for 6 records over 2 workers, but the file has 10:
        // the extra chunk starts must surface as a size mismatch.
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = numbered_corpus(dir.path(), 10);
        let table = OffsetTable::scan(&path, 3, 2).unwrap();
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(table.len() > 2);
        assert!(table.validate(2, size).is_err());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = numbered_corpus(dir.path(), 10);
        let table = OffsetTable::scan(&path, 3, 4).unwrap();

        let saved = dir.path().join("block_offset_4.json");
        table.save(&saved).unwrap();
        let loaded = OffsetTable::load(&saved).unwrap();
        assert_eq!(table, loaded);
    }

    #[test]
    fn validate_rejects_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = numbered_corpus(dir.path(), 10);
        let table = OffsetTable::scan(&path, 3, 4).unwrap();
        let size = std::fs::metadata(&path).unwrap().len();

        // wrong worker count
        assert!(table.validate(5, size).is_err());
        // corpus shrank below the recorded offsets
        assert!(table.validate(4, 5).is_err());
        // degenerate table is fine for one worker
        OffsetTable::single().validate(1, size).unwrap();
    }
}
