//! Read an expenses CSV export into a [`RawTable`].
//!
//! Expected header (any column order, extra columns ignored downstream):
//! date,amount,type,category

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::types::RawTable;

const BOM: char = '\u{feff}';

/// Read a CSV file from disk
pub fn read_csv(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let table = read_csv_from(file).with_context(|| format!("reading {}", path.display()))?;
    debug!(rows = table.len(), path = %path.display(), "read csv");
    Ok(table)
}

/// Read CSV data from any reader. A UTF-8 byte-order mark before the first
/// header is dropped.
pub fn read_csv_from<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches(BOM).to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}
