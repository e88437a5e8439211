//! JSON Lines (NDJSON) helpers for row-oriented track and step files.
//!
//! Each line is a single JSON object. The reader returns an iterator that
//! *owns* its underlying file and yields `Result<T>` per line so callers can
//! surface per-line errors with line numbers.
//!
//! We treat both `.jsonl` and `.ndjson` as equivalent.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::TrackTable;

/// Owning JSONL iterator over records of type `T`.
pub struct JsonlIter<T> {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonlIter<T> {
    fn new(file: File) -> Self {
        Self {
            rdr: BufReader::new(file),
            buf: String::with_capacity(1 << 10),
            line_no: 0,
            _item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Iterator for JsonlIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim_end_matches(['\n', '\r']);
                    // Blank lines (typically a trailing one) carry no record.
                    if line.trim().is_empty() {
                        continue;
                    }
                    let parsed: Result<T> = serde_json::from_str(line)
                        .with_context(|| format!("parse jsonl line {}", self.line_no));
                    return Some(parsed);
                }
                Err(e) => {
                    return Some(Err(e).with_context(|| format!("read line {}", self.line_no + 1)))
                }
            }
        }
    }
}

/// Stream records of type `T`, one per line.
///
/// # Errors
/// Opening the file may fail; individual items are `Err` for malformed lines.
pub fn stream_jsonl<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<JsonlIter<T>> {
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(JsonlIter::new(f))
}

/// Read a row-oriented track table (one object per row).
pub fn read_tracks_jsonl<P: AsRef<Path>>(path: P) -> Result<TrackTable> {
    let records = stream_jsonl::<Map<String, Value>, _>(path.as_ref())?
        .collect::<Result<Vec<_>>>()?;
    TrackTable::from_records(&records)
        .with_context(|| format!("build track table from {}", path.as_ref().display()))
}

/// Write a track table as one object per row.
pub fn write_tracks_jsonl<P: AsRef<Path>>(path: P, tracks: &TrackTable) -> Result<()> {
    write_jsonl(path, &tracks.to_records())
}

/// Write any serializable rows as JSON Lines.
pub fn write_jsonl<P: AsRef<Path>, T: Serialize>(path: P, items: &[T]) -> Result<()> {
    let f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    let mut w = BufWriter::new(f);
    for it in items {
        serde_json::to_writer(&mut w, it).context("serialize jsonl item")?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush writer")?;
    Ok(())
}
