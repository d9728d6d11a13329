//! PDF text extraction.
//!
//! Pages are extracted one by one with lopdf and joined with a single space
//! in page order. A page that fails to extract contributes an empty string.
//! If the document loads but every page comes back empty, pdf-extract gets
//! one whole-document attempt, since its font handling sometimes recovers
//! text lopdf cannot.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use crate::scanner::ScannerError;

pub fn extract_text_from_pdf(path: &Path) -> Result<String, ScannerError> {
    let doc = Document::load(path)
        .map_err(|e| ScannerError::Extraction(format!("{}: {e}", path.display())))?;
    Ok(join_pages(&doc, || pdf_extract::extract_text(path)))
}

pub fn extract_text_from_pdf_bytes(bytes: &[u8]) -> Result<String, ScannerError> {
    let doc = Document::load_mem(bytes).map_err(|e| ScannerError::Extraction(e.to_string()))?;
    Ok(join_pages(&doc, || pdf_extract::extract_text_from_mem(bytes)))
}

fn join_pages<F, E>(doc: &Document, fallback: F) -> String
where
    F: FnOnce() -> Result<String, E>,
    E: Display,
{
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let texts: Vec<String> = page_numbers
        .iter()
        .map(|&page| {
            doc.extract_text(&[page]).unwrap_or_else(|e| {
                debug!("Page {page} has no extractable text: {e}");
                String::new()
            })
        })
        .collect();

    if !texts.is_empty() && texts.iter().all(|t| t.trim().is_empty()) {
        // pdf-extract panics on some malformed fonts instead of erroring
        match panic::catch_unwind(AssertUnwindSafe(fallback)) {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!(
                    "Page-level extraction was empty; whole-document fallback recovered {} chars",
                    text.len()
                );
                return text;
            }
            Ok(Ok(_)) => debug!("Whole-document fallback found no text either"),
            Ok(Err(e)) => warn!("Whole-document fallback extraction failed: {e}"),
            Err(_) => warn!("Whole-document fallback extraction panicked"),
        }
    }

    let joined = texts.join(" ");
    debug!("Extracted {} chars from {} pages", joined.len(), texts.len());
    joined
}


#[cfg(test)]
mod tests {
    use super::test_support::{pdf_bytes, pdf_with_broken_first_page};
    use super::*;

    #[test]
    fn test_pages_joined_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, pdf_bytes(&["Experience Python", "Education SQL"])).unwrap();

        let text = extract_text_from_pdf(&path).unwrap();
        let python = text.find("Python").expect("first page text");
        let sql = text.find("SQL").expect("second page text");
        assert!(python < sql);
    }

    #[test]
    fn test_in_memory_extraction_matches_file() {
        let bytes = pdf_bytes(&["Rust"]);
        let text = extract_text_from_pdf_bytes(&bytes).unwrap();
        assert!(text.contains("Rust"));
    }

    #[test]
    fn test_missing_file_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_text_from_pdf(&dir.path().join("absent.pdf")).unwrap_err();
        assert!(matches!(err, ScannerError::Extraction(_)));
    }

    #[test]
    fn test_garbage_bytes_are_extraction_error() {
        let err = extract_text_from_pdf_bytes(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ScannerError::Extraction(_)));
    }

    #[test]
    fn test_empty_pages_do_not_fail_the_document() {
        let bytes = pdf_bytes(&["", ""]);
        assert!(extract_text_from_pdf_bytes(&bytes).is_ok());
    }

    #[test]
    fn test_failed_page_does_not_fail_the_document() {
        let bytes = pdf_with_broken_first_page(&["Bravo"]);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let text = extract_text_from_pdf_bytes(&bytes).unwrap();
        assert!(text.contains("Bravo"), "text was {text:?}");
    }
}
