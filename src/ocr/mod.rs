//! OCR engine abstraction.
//!
//! The pipeline never talks to an OCR tool directly; the batch driver hands it
//! the [`RawPage`] produced by an [`OcrEngine`].

pub mod tesseract;

use std::path::{Path, PathBuf};

pub use tesseract::TesseractOcr;

/// Text recognised on one scanned page.
///
/// An empty page is a successful but ineffective recognition, distinct from
/// an engine failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    text: String,
}

impl RawPage {
    /// Wrap recognised text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The recognised text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the engine recognised nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A scanned page to recognise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Page number, also used as the hymn number.
    pub number: u32,
    /// Path to the page image.
    pub image: PathBuf,
}

impl PageRef {
    /// Reference the image for a page number.
    pub fn new(number: u32, image: impl Into<PathBuf>) -> Self {
        Self { number, image: image.into() }
    }

    /// Path to the page image.
    pub fn image(&self) -> &Path {
        &self.image
    }
}

/// Trait for OCR providers.
///
/// Implementations block until recognition finishes. Failures of the engine
/// itself are returned as [`crate::error::Error::Ocr`]; they are never retried.
pub trait OcrEngine {
    /// Recognise the text of one page.
    fn run_ocr(&self, page: &PageRef) -> crate::error::Result<RawPage>;

    /// Engine name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_page_detection() {
        assert!(RawPage::new(" \n\t\n").is_blank());
        assert!(RawPage::default().is_blank());
        assert!(!RawPage::new("1. Holy").is_blank());
    }

    #[test]
    fn page_ref_keeps_image_path() {
        let page = PageRef::new(12, "/scans/SDAH/012.png");
        assert_eq!(page.number, 12);
        assert_eq!(page.image(), Path::new("/scans/SDAH/012.png"));
    }
}
