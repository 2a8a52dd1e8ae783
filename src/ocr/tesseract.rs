//! Tesseract command-line OCR engine.

use std::path::PathBuf;
use std::process::Command;

use super::{OcrEngine, PageRef, RawPage};
use crate::constants::batch::DEFAULT_TESSERACT;
use crate::error::{Error, Result};

/// Characters Tesseract may emit: digits, ASCII letters and hymn punctuation.
const CHAR_WHITELIST: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz.,-():;\" ";

/// Page segmentation mode: fully automatic, no orientation detection.
const PAGE_SEG_MODE: u8 = 3;

/// Runs the `tesseract` binary on each page image.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    page_seg_mode: u8,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT)
    }
}

impl TesseractOcr {
    /// Use the given `tesseract` executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into(), page_seg_mode: PAGE_SEG_MODE }
    }

    /// Override the page segmentation mode (`--psm`).
    #[must_use]
    pub const fn with_page_seg_mode(mut self, mode: u8) -> Self {
        self.page_seg_mode = mode;
        self
    }

    fn command(&self, page: &PageRef) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(page.image())
            .arg("-")
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={CHAR_WHITELIST}"));
        cmd
    }
}

impl OcrEngine for TesseractOcr {
    fn run_ocr(&self, page: &PageRef) -> Result<RawPage> {
        let output = self.command(page).output().map_err(|e| {
            Error::ocr(page.number, format!("failed to run {} (is it installed?): {e}", self.binary.display()))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ocr(page.number, format!("tesseract {}: {}", output.status, stderr.trim())));
        }

        Ok(RawPage::new(String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn command_passes_image_psm_and_whitelist() {
        let ocr = TesseractOcr::default().with_page_seg_mode(6);
        let cmd = ocr.command(&PageRef::new(5, "/scans/005.png"));
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(cmd.get_program(), "tesseract");
        assert_eq!(args[0], "/scans/005.png");
        assert_eq!(args[1], "-");
        assert_eq!(args[2..4], ["--psm".to_string(), "6".to_string()]);
        assert!(args[5].starts_with("tessedit_char_whitelist=0123456789"));
    }

    #[test]
    fn missing_binary_is_ocr_error() {
        let ocr = TesseractOcr::new("/nonexistent/hymnscan-tesseract");
        match ocr.run_ocr(&PageRef::new(7, "/scans/007.png")) {
            Err(Error::Ocr { page, .. }) => assert_eq!(page, 7),
            other => panic!("Expected Ocr error, got {other:?}"),
        }
    }
}
