//! Text extraction: pull the embedded text layer out of a PDF.
//!
//! Slide decks are digital PDFs with a proper text layer, so no
//! rasterisation or OCR is involved — [`pdf_extract`] reads the text
//! directly. The trait seam exists so the ingestion loop can be exercised
//! in tests without real PDF bytes.
//!
//! Failure here is the only per-file failure in the pipeline: an
//! unreadable or corrupt file yields a [`FileError`], which the caller must
//! treat as "skip now, retry next run". An empty string is a valid success
//! (a deck of pure images has an empty text layer) and is handled by the
//! elaboration stage, not here.

use crate::error::FileError;
use std::path::Path;

/// Extracts the full text of one input file.
pub trait TextExtractor: Send + Sync {
    /// Return the concatenated text of all pages in document order,
    /// separated by a blank line.
    fn extract(&self, path: &Path) -> Result<String, FileError>;
}

/// PDF text extractor backed by the `pdf-extract` crate.
///
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, FileError> {
        let bytes = std::fs::read(path).map_err(|e| FileError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            FileError::ExtractionFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;

        Ok(pages.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a valid one-page PDF with text using lopdf (the library that
    /// pdf-extract uses internally).
    fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_stream = Stream::new(dictionary! {}, content.into_bytes());
        let content_id = doc.add_object(content_stream);

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn extracts_text_from_a_generated_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lec1.pdf");
        std::fs::write(&path, make_test_pdf("Hello slides")).unwrap();

        let text = PdfTextExtractor.extract(&path).unwrap();
        assert!(text.contains("Hello slides"), "got: {text:?}");
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfTextExtractor.extract(&dir.path().join("absent.pdf"));
        assert!(matches!(result, Err(FileError::Unreadable { .. })));
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let result = PdfTextExtractor.extract(&path);
        assert!(matches!(result, Err(FileError::ExtractionFailed { .. })));
    }
}
