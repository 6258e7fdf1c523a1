// Editable row collection for one working session.
//
// Imports build a complete `Vec<Row>` first and only then call `replace`, so a
// failed import never leaves the session half-updated.

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::import::pdf::layout::DocumentLayoutGrammar;
use crate::import::pdf::source::{LopdfSource, PageTextSource};
use crate::import::{self, ImportError};
use crate::sheet::{Column, Row, StatLine, DEFAULT_GAME};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("row {index} out of range (session has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    rows: Vec<Row>,
}

impl Session {
    pub fn new(rows: Vec<Row>) -> Self {
        Session { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Swap in a complete new row set.
    pub fn replace(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    /// Append a blank row for game `G1` dated `today`. Returns its index.
    pub fn add_empty_row(&mut self, today: NaiveDate) -> usize {
        let date = today.format("%Y-%m-%d").to_string();
        self.rows.push(Row::blank(DEFAULT_GAME, &date));
        self.rows.len() - 1
    }

    /// Set one cell from user text. The column name is resolved like a CSV
    /// header.
    pub fn update_cell(
        &mut self,
        index: usize,
        column: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        let column =
            Column::lookup(column).ok_or_else(|| SessionError::UnknownColumn(column.to_string()))?;
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(SessionError::RowOutOfRange { index, len })?;
        row.set_cell(column, value);
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Result<Row, SessionError> {
        if index >= self.rows.len() {
            return Err(SessionError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Replace the session with the demo dataset.
    pub fn load_sample(&mut self) {
        self.replace(sample_rows());
    }

    /// Import a CSV file. On error the session keeps its rows.
    pub fn import_csv(&mut self, path: &Path) -> Result<usize, ImportError> {
        let rows = import::csv::load_rows(path)?;
        let count = rows.len();
        self.replace(rows);
        info!("session now holds {count} rows from {}", path.display());
        Ok(count)
    }

    /// Import a PDF box score. On error the session keeps its rows.
    pub async fn import_pdf(
        &mut self,
        path: &Path,
        grammar: &dyn DocumentLayoutGrammar,
    ) -> Result<usize, ImportError> {
        let source = LopdfSource::open(path).await?;
        let count = self.import_pdf_from(&source, grammar).await?;
        info!("session now holds {count} rows from {}", path.display());
        Ok(count)
    }

    /// Import from already-opened page text. A document that matches no
    /// player line leaves the session unchanged.
    pub async fn import_pdf_from(
        &mut self,
        source: &dyn PageTextSource,
        grammar: &dyn DocumentLayoutGrammar,
    ) -> Result<usize, ImportError> {
        let rows = import::pdf::extract_rows(source, grammar).await?;
        let count = rows.len();
        self.replace(rows);
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Demo data
// ---------------------------------------------------------------------------

fn sample_row(
    game: &str,
    date: &str,
    team: &str,
    player: &str,
    no: u32,
    stats: [f64; 16],
) -> Row {
    let [min, pts, fgm, fga, tpm, tpa, ftm, fta, oreb, dreb, reb, ast, stl, blk, tov, pf] = stats;
    Row {
        game: game.to_string(),
        date: date.to_string(),
        team: team.to_string(),
        player: player.to_string(),
        no,
        stats: StatLine {
            min,
            pts,
            fgm,
            fga,
            tpm,
            tpa,
            ftm,
            fta,
            oreb,
            dreb,
            reb,
            ast,
            stl,
            blk,
            tov,
            pf,
        },
    }
}

/// Two players, each appearing for ROU in G1 and for STV in G2.
pub fn sample_rows() -> Vec<Row> {
    vec![
        sample_row(
            "G1", "2025-09-01", "ROU", "Dupont", 7,
            [28.0, 16.0, 6.0, 12.0, 2.0, 5.0, 2.0, 3.0, 2.0, 5.0, 7.0, 4.0, 1.0, 0.0, 2.0, 3.0],
        ),
        sample_row(
            "G1", "2025-09-01", "ROU", "Martin", 11,
            [22.0, 9.0, 4.0, 10.0, 1.0, 3.0, 0.0, 0.0, 1.0, 3.0, 4.0, 2.0, 2.0, 1.0, 1.0, 2.0],
        ),
        sample_row(
            "G2", "2025-09-08", "STV", "Dupont", 7,
            [31.0, 22.0, 8.0, 15.0, 3.0, 6.0, 3.0, 4.0, 1.0, 6.0, 7.0, 5.0, 0.0, 1.0, 3.0, 2.0],
        ),
        sample_row(
            "G2", "2025-09-08", "STV", "Martin", 11,
            [19.0, 6.0, 3.0, 8.0, 0.0, 2.0, 0.0, 0.0, 0.0, 4.0, 4.0, 1.0, 1.0, 0.0, 1.0, 1.0],
        ),
    ]
}
