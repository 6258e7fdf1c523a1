// CSV template and data export.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::sheet::{Column, Row};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn write_header<W: Write>(wtr: &mut csv::Writer<W>) -> Result<(), csv::Error> {
    wtr.write_record(Column::ALL.iter().map(|c| c.name()))
}

/// Blank template: the header record alone.
pub fn write_template<W: Write>(out: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    write_header(&mut wtr)?;
    wtr.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

/// Header row followed by every row in session order.
pub fn write_rows<W: Write>(out: W, rows: &[Row]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    write_header(&mut wtr)?;
    for row in rows {
        wtr.write_record(row.cells())?;
    }
    wtr.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

fn create(path: &Path) -> Result<std::fs::File, ExportError> {
    std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn save_template(path: &Path) -> Result<(), ExportError> {
    let file = create(path)?;
    write_template(file)?;
    info!("wrote CSV template to {}", path.display());
    Ok(())
}

pub fn save_rows(path: &Path, rows: &[Row]) -> Result<(), ExportError> {
    let file = create(path)?;
    write_rows(file, rows)?;
    info!("exported {} rows to {}", rows.len(), path.display());
    Ok(())
}
