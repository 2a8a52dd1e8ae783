//! Hymn records and the record builder.

use serde::{Deserialize, Serialize};

use super::{Detection, ExtractionFailure};
use crate::types::{HymnId, HymnalCode, LanguageCode};

/// One numbered verse of a hymn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// 1-based verse number.
    pub number: u32,
    /// Verse text; lines within a verse are separated by `\n`.
    pub text: String,
}

/// A hymn recovered from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HymnRecord {
    /// `{hymnal}-{language}-{number:03}`.
    pub id: HymnId,
    /// Hymn number within the hymnal.
    pub number: u32,
    /// Non-empty title.
    pub title: String,
    /// Language of the text.
    pub language: LanguageCode,
    /// Verses in page order.
    pub verses: Vec<Verse>,
}

/// Assemble a record from detector and segmenter output.
///
/// A record without a title or without verses is never produced.
pub fn build_record(
    hymnal: &HymnalCode,
    language: &LanguageCode,
    number: u32,
    detection: Detection,
    verses: Vec<Verse>,
) -> Result<HymnRecord, ExtractionFailure> {
    let title = detection
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(ExtractionFailure::MissingTitle)?;
    if verses.is_empty() {
        return Err(ExtractionFailure::NoVerses);
    }

    Ok(HymnRecord {
        id: HymnId::new(hymnal, language, number),
        number,
        title,
        language: language.clone(),
        verses,
    })
}
