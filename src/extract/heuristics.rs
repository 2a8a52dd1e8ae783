//! Tunable thresholds for the extraction pipeline.
//!
//! Defaults come from [`crate::constants`]; a hymnal with unusual typesetting
//! can override any subset of fields from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{detect, normalize, verse};
use crate::error::{Error, Result};

/// Heuristic thresholds, vocabulary and whitelists used by every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Lines at or below this length are dropped.
    pub short_line_max: usize,
    /// Letter/hyphen-only lines at or below this length are noise.
    pub noise_max_len: usize,
    /// Highest digit accepted as a verse marker.
    pub max_verse_marker: u32,
    /// Title candidates must be longer than this.
    pub title_min_len: usize,
    /// Noise threshold applied to title candidates.
    pub title_noise_max_len: usize,
    /// Cleaned titles must be longer than this.
    pub title_clean_min_len: usize,
    /// Terms that qualify a line as a title.
    pub title_vocabulary: Vec<String>,
    /// Single-character words kept by verse cleaning.
    pub single_letter_words: Vec<char>,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            short_line_max: normalize::SHORT_LINE_MAX,
            noise_max_len: normalize::NOISE_MAX_LEN,
            max_verse_marker: detect::MAX_VERSE_MARKER,
            title_min_len: detect::TITLE_MIN_LEN,
            title_noise_max_len: detect::TITLE_NOISE_MAX_LEN,
            title_clean_min_len: detect::TITLE_CLEAN_MIN_LEN,
            title_vocabulary: detect::SACRED_VOCABULARY.iter().map(ToString::to_string).collect(),
            single_letter_words: verse::SINGLE_LETTER_WORDS.to_vec(),
        }
    }
}

impl Heuristics {
    /// Load overrides from a JSON file. Fields absent from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs_err::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| Error::parse(e.to_string(), path.to_path_buf()))
    }

    /// True when the line is too short to carry text.
    pub fn is_short(&self, line: &str) -> bool {
        line.trim().chars().count() <= self.short_line_max
    }

    /// True when the line is a stray OCR fragment.
    pub fn is_noise(&self, line: &str) -> bool {
        is_fragment(line.trim(), self.noise_max_len)
    }

    /// Noise check applied to title candidates.
    pub fn is_title_noise(&self, line: &str) -> bool {
        is_fragment(line.trim(), self.title_noise_max_len)
    }

    /// Split a leading verse marker (`"3."`) from a line.
    ///
    /// Returns the verse number and the trimmed remainder of the line.
    pub fn verse_marker<'a>(&self, line: &'a str) -> Option<(u32, &'a str)> {
        let line = line.trim();
        let mut chars = line.chars();
        let digit = chars.next()?.to_digit(10)?;
        if chars.next()? != '.' || !(1..=self.max_verse_marker).contains(&digit) {
            return None;
        }
        Some((digit, line[2..].trim()))
    }

    /// True when the word is a whitelisted single-letter word.
    pub fn is_single_letter_word(&self, word: &str) -> bool {
        let mut chars = word.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self
                .single_letter_words
                .iter()
                .any(|w| w.to_lowercase().eq(c.to_lowercase())),
            _ => false,
        }
    }
}

/// Letters, whitespace and hyphens only, no longer than `max_len`.
fn is_fragment(text: &str, max_len: usize) -> bool {
    text.chars().count() <= max_len
        && text.chars().all(|c| c.is_alphabetic() || c.is_whitespace() || c == '-')
}
