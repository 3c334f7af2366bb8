//! PDF text extraction using lopdf and pdf-extract.

use std::fs;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace};

use super::{Result, TextExtractor};
use crate::error::PdfError;

/// Reads receipt PDFs from disk and returns their page text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract page text from PDF bytes already in memory.
    pub fn extract_pages_from_mem(&self, data: &[u8]) -> Result<Vec<String>> {
        let raw = Self::prepare(data)?;

        let pages = pdf_extract::extract_text_from_mem_by_pages(&raw)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        trace!(
            "Extracted {} chars over {} pages",
            pages.iter().map(String::len).sum::<usize>(),
            pages.len()
        );
        Ok(pages)
    }

    /// Validate the document structure and return bytes pdf-extract can read.
    fn prepare(data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        // Receipts are sometimes "protected" with an empty password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            return Ok(decrypted);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(data.to_vec())
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        let data = fs::read(path).map_err(|e| PdfError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.extract_pages_from_mem(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_a_parse_error() {
        let result = PdfTextExtractor::new().extract_pages_from_mem(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfTextExtractor::new().extract_pages(&dir.path().join("gone.pdf"));
        assert!(matches!(result, Err(PdfError::Read { .. })));
    }
}
