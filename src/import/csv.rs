// CSV row normalization.
//
// Header cells are matched to canonical columns by case-insensitive,
// whitespace-tolerant exact name (first matching header wins). Missing
// columns and malformed numeric cells fall back to defaults; no row is ever
// dropped.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::import::ImportError;
use crate::sheet::{Column, Row};

// ---------------------------------------------------------------------------
// Header mapping
// ---------------------------------------------------------------------------

/// Canonical column -> index of the source header that feeds it.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    slots: Vec<(Column, Option<usize>)>,
}

impl HeaderMap {
    pub fn new<'h, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'h str>,
    {
        let mut slots: Vec<(Column, Option<usize>)> =
            Column::ALL.iter().map(|&c| (c, None)).collect();
        for (idx, header) in headers.into_iter().enumerate() {
            let header = if idx == 0 {
                header.trim_start_matches('\u{feff}')
            } else {
                header
            };
            let Some(column) = Column::lookup(header) else {
                continue;
            };
            if let Some(slot) = slots.iter_mut().find(|(c, _)| *c == column) {
                if slot.1.is_none() {
                    slot.1 = Some(idx);
                }
            }
        }
        HeaderMap { slots }
    }

    pub fn index_of(&self, column: Column) -> Option<usize> {
        self.slots
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, idx)| *idx)
    }

    /// Canonical columns that no header maps to.
    pub fn missing(&self) -> Vec<Column> {
        self.slots
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(c, _)| *c)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Build one canonical row from a header-keyed record.
pub fn normalize_record(map: &HeaderMap, record: &StringRecord) -> Row {
    let mut row = Row::default();
    for column in Column::ALL {
        let cell = map.index_of(column).and_then(|idx| record.get(idx));
        if let Some(raw) = cell {
            row.set_cell(column, raw);
        }
    }
    row
}

/// Normalize already-parsed records against their header row.
pub fn normalize_records(headers: &StringRecord, records: &[StringRecord]) -> Vec<Row> {
    let map = HeaderMap::new(headers.iter());
    records.iter().map(|r| normalize_record(&map, r)).collect()
}

/// Parse CSV text and normalize every record. A structural parser error
/// aborts the whole import.
pub fn read_rows<R: Read>(rdr: R) -> Result<Vec<Row>, ImportError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers()?.clone();
    let map = HeaderMap::new(headers.iter());

    let missing = map.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
        debug!("CSV has no column for {}; using defaults", names.join(", "));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(normalize_record(&map, &record));
    }
    info!("normalized {} CSV rows", rows.len());
    Ok(rows)
}

/// Load and normalize a CSV file.
pub fn load_rows(path: &Path) -> Result<Vec<Row>, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_rows(file)
}
