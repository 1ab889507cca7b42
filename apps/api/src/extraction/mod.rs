//! Announcement extraction: PDF bytes to one text blob, pages in stored order.
//!
//! `pdf-extract` produces the text (it understands font encodings); `lopdf` checks the
//! document structure first and serves as the per-page fallback when `pdf-extract`
//! gives up on the whole file. A page that yields nothing contributes an empty string.

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use lopdf::Document;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("the upload is not a readable PDF document: {0}")]
    Malformed(String),

    #[error("the PDF is encrypted")]
    Encrypted,

    #[error("the PDF has no pages")]
    NoPages,
}

/// Concatenated announcement text: every page's text followed by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementText {
    text: String,
    pages: usize,
}

impl AnnouncementText {
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut count = 0;
        for page in pages {
            text.push_str(page.as_ref());
            text.push('\n');
            count += 1;
        }
        Self { text, pages: count }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// True when no page produced any visible text (e.g. a scanned document).
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extracts announcement text from raw PDF bytes. CPU-bound; call from a blocking context.
pub fn extract_announcement(bytes: &[u8]) -> Result<AnnouncementText, ExtractionError> {
    let document =
        Document::load_mem(bytes).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

    if document.is_encrypted() {
        return Err(ExtractionError::Encrypted);
    }

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Err(ExtractionError::NoPages);
    }

    let pages = match extract_with_pdf_extract(bytes, page_numbers.len()) {
        Some(pages) => pages,
        None => page_numbers
            .iter()
            .map(|&number| fallback_page_text(&document, number))
            .collect(),
    };

    let announcement = AnnouncementText::from_pages(pages.iter().map(|p| trim_line_breaks(p)));
    info!(
        "Extracted announcement: {} pages, {} chars",
        announcement.page_count(),
        announcement.as_str().chars().count()
    );
    Ok(announcement)
}

/// Runs [`extract_announcement`] on the blocking pool.
pub async fn extract_announcement_blocking(
    bytes: Bytes,
) -> Result<AnnouncementText, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_announcement(&bytes))
        .await
        .map_err(|e| {
            // lopdf can panic on hostile input; the panic is confined to the blocking task.
            warn!("PDF extraction task aborted: {e}");
            ExtractionError::Malformed("the PDF parser aborted on this document".to_string())
        })?
}

fn extract_with_pdf_extract(bytes: &[u8], expected_pages: usize) -> Option<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match result {
        Ok(Ok(pages)) if pages.len() == expected_pages => Some(pages),
        Ok(Ok(pages)) => {
            warn!(
                "pdf-extract returned {} pages, document has {}; using per-page fallback",
                pages.len(),
                expected_pages
            );
            None
        }
        Ok(Err(e)) => {
            warn!("pdf-extract failed ({e}); using per-page fallback");
            None
        }
        Err(_) => {
            warn!("pdf-extract panicked; using per-page fallback");
            None
        }
    }
}

/// Both extractors frame a page with layout line breaks (`pdf-extract` before the text,
/// `lopdf` after each text object); the page text is what lies between them.
fn trim_line_breaks(page: &str) -> &str {
    page.trim_matches(|c| c == '\n' || c == '\r')
}

fn fallback_page_text(document: &Document, page_number: u32) -> String {
    match document.extract_text(&[page_number]) {
        Ok(text) => text,
        Err(e) => {
            debug!("Page {page_number} yielded no text: {e}");
            String::new()
        }
    }
}
