// Import pipelines: CSV normalization and PDF box-score extraction.
//
// Both pipelines produce a complete `Vec<Row>` or an error; callers replace
// the session's rows only on success.

pub mod csv;
pub mod pdf;

use serde::{Deserialize, Serialize};

use crate::import::pdf::source::PdfSourceError;

/// Shown when a PDF yields no rows: the grammar did not match this layout.
pub const UNRECOGNIZED_LAYOUT_MESSAGE: &str =
    "PDF layout not recognized: no player lines could be extracted. \
     Enter this game through the CSV template (or add rows manually) instead.";

/// Where a set of rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Csv,
    Pdf,
    Sample,
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportKind::Csv => write!(f, "csv"),
            ImportKind::Pdf => write!(f, "pdf"),
            ImportKind::Sample => write!(f, "sample"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Structural CSV failure; the parser's message is kept verbatim.
    #[error("{0}")]
    Csv(#[from] ::csv::Error),

    #[error(transparent)]
    PdfSource(#[from] PdfSourceError),

    /// The layout grammar matched nothing in the document.
    #[error("{}", UNRECOGNIZED_LAYOUT_MESSAGE)]
    UnrecognizedLayout { layout: String },
}
