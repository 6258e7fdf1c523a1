// PDF box-score extraction.
//
// Page text from a `PageTextSource` is concatenated, normalized, and handed to
// a `DocumentLayoutGrammar`. A document that yields no rows is rejected as an
// unrecognized layout.

pub mod date;
pub mod layout;
pub mod source;
pub mod tokens;

use tracing::{info, warn};

use crate::import::ImportError;
use crate::sheet::Row;

use layout::DocumentLayoutGrammar;
use source::PageTextSource;

/// Collapse whitespace runs to single spaces and turn the first `,` into `.`.
pub fn normalize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replacen(',', ".", 1)
}

/// Concatenate every page's fragments, pages in order, space separated.
pub async fn collect_text(source: &dyn PageTextSource) -> Result<String, ImportError> {
    let count = source.page_count().await?;
    let mut pages = Vec::with_capacity(count as usize);
    for page in 1..=count {
        let fragments = source.page_fragments(page).await?;
        pages.push(fragments.join(" "));
    }
    info!("read {count} PDF pages");
    Ok(pages.join(" "))
}

/// Run `grammar` over already-extracted document text.
pub fn extract_rows_from_text(
    text: &str,
    grammar: &dyn DocumentLayoutGrammar,
) -> Result<Vec<Row>, ImportError> {
    let normalized = normalize_text(text);
    let rows = grammar.extract(&normalized);
    if rows.is_empty() {
        warn!("{} layout matched no player lines", grammar.name());
        return Err(ImportError::UnrecognizedLayout {
            layout: grammar.name().to_string(),
        });
    }
    info!("extracted {} rows from PDF", rows.len());
    Ok(rows)
}

pub async fn extract_rows(
    source: &dyn PageTextSource,
    grammar: &dyn DocumentLayoutGrammar,
) -> Result<Vec<Row>, ImportError> {
    let text = collect_text(source).await?;
    extract_rows_from_text(&text, grammar)
}
