// Page text sources.
//
// The extractor only needs a page count and the text fragments of each page.
// `LopdfSource` reads a real PDF; `TextPages` serves fixed text for tests and
// for callers that already hold extracted text.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum PdfSourceError {
    #[error("failed to read PDF {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("PDF extraction task failed: {0}")]
    Task(String),
}

/// Pages are numbered from 1.
#[async_trait]
pub trait PageTextSource: Send + Sync {
    async fn page_count(&self) -> Result<u32, PdfSourceError>;

    /// Text fragments of one page, in reading order.
    async fn page_fragments(&self, page: u32) -> Result<Vec<String>, PdfSourceError>;
}

fn page_index(page: u32, count: usize) -> Result<usize, PdfSourceError> {
    let count_u32 = u32::try_from(count).unwrap_or(u32::MAX);
    if page == 0 || page > count_u32 {
        return Err(PdfSourceError::PageOutOfRange {
            page,
            count: count_u32,
        });
    }
    Ok(page as usize - 1)
}

// ---------------------------------------------------------------------------
// lopdf
// ---------------------------------------------------------------------------

/// A PDF document decoded with lopdf. Page text is extracted once, off the
/// async runtime, when the source is built. Each page keeps its text items in
/// content-stream order, one per text-showing operator.
#[derive(Debug, Clone)]
pub struct LopdfSource {
    pages: Vec<Vec<String>>,
}

impl LopdfSource {
    pub async fn open(path: &Path) -> Result<Self, PdfSourceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PdfSourceError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        Self::from_bytes(bytes).await
    }

    pub async fn from_bytes(bytes: Vec<u8>) -> Result<Self, PdfSourceError> {
        tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| PdfSourceError::Task(e.to_string()))?
    }
}

/// TJ offsets below this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -120.0;

fn extract_pages(bytes: &[u8]) -> Result<LopdfSource, PdfSourceError> {
    let document = Document::load_mem(bytes).map_err(|e| PdfSourceError::Parse(e.to_string()))?;

    let mut pages = Vec::new();
    for (page, page_id) in document.get_pages() {
        match page_items(&document, page_id) {
            Ok(items) => pages.push(items),
            Err(e) => {
                warn!("no text extracted from PDF page {page}: {e}");
                pages.push(Vec::new());
            }
        }
    }
    debug!("decoded PDF with {} pages", pages.len());
    Ok(LopdfSource { pages })
}

/// Text items of one page. `Tj`, `'` and `"` each show one string; a `TJ`
/// array is one item, with a space where a kerning offset opens a word gap.
fn page_items(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = document
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(document) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                debug!("font {} has no usable encoding: {e}", String::from_utf8_lossy(&name));
                None
            }
        })
        .collect();
    let content = document.get_and_decode_page_content(page_id)?;

    let mut items = Vec::new();
    let mut encoding: Option<&Encoding> = None;
    for op in &content.operations {
        let item = match op.operator.as_str() {
            "Tf" => {
                encoding = op
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name));
                continue;
            }
            "Tj" | "'" => op.operands.first().map(|o| shown_text(encoding, o)),
            "\"" => op.operands.get(2).map(|o| shown_text(encoding, o)),
            "TJ" => op.operands.first().map(|o| shown_text(encoding, o)),
            _ => None,
        };
        if let Some(item) = item {
            let item = item.trim();
            if !item.is_empty() {
                items.push(item.to_string());
            }
        }
    }
    Ok(items)
}

fn shown_text(encoding: Option<&Encoding>, operand: &Object) -> String {
    match operand {
        Object::String(bytes, _) => decode_bytes(encoding, bytes),
        Object::Array(parts) => {
            let mut text = String::new();
            for part in parts {
                match part {
                    Object::String(bytes, _) => text.push_str(&decode_bytes(encoding, bytes)),
                    Object::Integer(_) | Object::Real(_) => {
                        if part.as_float().is_ok_and(|gap| gap < TJ_SPACE_THRESHOLD) {
                            text.push(' ');
                        }
                    }
                    _ => {}
                }
            }
            text
        }
        _ => String::new(),
    }
}

// Fonts lopdf cannot map fall back to Latin-1, which covers the ASCII digits
// and slashes a stat table is made of.
fn decode_bytes(encoding: Option<&Encoding>, bytes: &[u8]) -> String {
    encoding
        .and_then(|enc| Document::decode_text(enc, bytes).ok())
        .unwrap_or_else(|| bytes.iter().map(|&b| char::from(b)).collect())
}

#[async_trait]
impl PageTextSource for LopdfSource {
    async fn page_count(&self) -> Result<u32, PdfSourceError> {
        Ok(u32::try_from(self.pages.len()).unwrap_or(u32::MAX))
    }

    async fn page_fragments(&self, page: u32) -> Result<Vec<String>, PdfSourceError> {
        let idx = page_index(page, self.pages.len())?;
        Ok(self.pages[idx].clone())
    }
}

// ---------------------------------------------------------------------------
// In-memory text
// ---------------------------------------------------------------------------

/// Pre-extracted pages, each a list of fragments.
#[derive(Debug, Clone, Default)]
pub struct TextPages {
    pages: Vec<Vec<String>>,
}

impl TextPages {
    pub fn new(pages: Vec<Vec<String>>) -> Self {
        TextPages { pages }
    }

    /// One page per string, each line a fragment.
    pub fn from_page_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = texts
            .into_iter()
            .map(|t| t.as_ref().lines().map(str::to_string).collect())
            .collect();
        TextPages { pages }
    }
}

#[async_trait]
impl PageTextSource for TextPages {
    async fn page_count(&self) -> Result<u32, PdfSourceError> {
        Ok(u32::try_from(self.pages.len()).unwrap_or(u32::MAX))
    }

    async fn page_fragments(&self, page: u32) -> Result<Vec<String>, PdfSourceError> {
        let idx = page_index(page, self.pages.len())?;
        Ok(self.pages[idx].clone())
    }
}
