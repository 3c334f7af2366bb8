//! Document text extraction.

mod extractor;

pub use extractor::PdfTextExtractor;

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of page text for a receipt document.
pub trait TextExtractor {
    /// Extract the text of every page, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for &T {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        (**self).extract_pages(path)
    }
}
