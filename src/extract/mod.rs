//! OCR text to hymn record pipeline.
//!
//! Normalizes a page's OCR text, detects its title and leading verse, splits
//! it into verses and assembles a [`HymnRecord`]. Every stage is a pure
//! function of its input and the [`Heuristics`] in use.

pub mod detect;
pub mod heuristics;
pub mod normalize;
pub mod record;
pub mod segment;

use thiserror::Error;

use crate::ocr::RawPage;
use crate::types::{HymnalCode, LanguageCode};

pub use detect::{detect, Detection};
pub use heuristics::Heuristics;
pub use normalize::{normalize, NormalizedLine};
pub use record::{build_record, HymnRecord, Verse};
pub use segment::{clean_verse_text, segment};

/// Why a page produced no record. These are routine outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// Nothing survived normalization.
    #[error("no extractable content after normalization")]
    EmptyNormalization,
    /// No line qualified as a title.
    #[error("no title detected")]
    MissingTitle,
    /// No verse could be recovered.
    #[error("no verses recovered")]
    NoVerses,
}

/// Runs the extraction pipeline for one hymnal and language.
#[derive(Debug, Clone)]
pub struct HymnExtractor {
    hymnal: HymnalCode,
    language: LanguageCode,
    heuristics: Heuristics,
}

impl HymnExtractor {
    /// Create an extractor with default heuristics.
    pub fn new(hymnal: HymnalCode, language: LanguageCode) -> Self {
        Self::with_heuristics(hymnal, language, Heuristics::default())
    }

    /// Create an extractor with tuned heuristics.
    pub const fn with_heuristics(hymnal: HymnalCode, language: LanguageCode, heuristics: Heuristics) -> Self {
        Self { hymnal, language, heuristics }
    }

    /// Extract the hymn on a page. The page number becomes the hymn number.
    pub fn extract_hymn(&self, page_number: u32, page: &RawPage) -> Result<HymnRecord, ExtractionFailure> {
        let lines = normalize(page.text(), &self.heuristics);
        if lines.is_empty() {
            return Err(ExtractionFailure::EmptyNormalization);
        }

        let detection = detect(&lines, &self.heuristics);
        let verses = segment(&lines, &self.heuristics);
        tracing::debug!(
            "Page {page_number}: {} lines, title {:?}, leading verse {:?}, {} verses",
            lines.len(),
            detection.title,
            detection.leading_verse,
            verses.len()
        );

        build_record(&self.hymnal, &self.language, page_number, detection, verses)
    }
}
