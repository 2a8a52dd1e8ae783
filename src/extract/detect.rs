//! Verse number and title detection.
//!
//! Lexical heuristics only. A wrong or missing title is a tolerated outcome;
//! callers decide what to do with an empty [`Detection`].

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{collapse_whitespace, NormalizedLine};
use super::Heuristics;

/// Regex matching a capitalized word followed later by another capital.
#[allow(clippy::expect_used)]
static RE_CAPITAL_TRANSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Lu}\p{Ll}+.*\p{Lu}").expect("valid regex: RE_CAPITAL_TRANSITION")
});

/// Result of scanning a page for its leading verse number and title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    /// Digit of the first verse marker on the page.
    pub leading_verse: Option<u32>,
    /// Cleaned title, if a plausible line was found.
    pub title: Option<String>,
}

/// Scan normalized lines for the leading verse number and a title.
pub fn detect(lines: &[NormalizedLine], heuristics: &Heuristics) -> Detection {
    Detection {
        leading_verse: detect_leading_verse(lines, heuristics),
        title: detect_title(lines, heuristics),
    }
}

/// Digit of the first line that starts with a verse marker.
pub fn detect_leading_verse(lines: &[NormalizedLine], heuristics: &Heuristics) -> Option<u32> {
    lines
        .iter()
        .find_map(|line| heuristics.verse_marker(line.as_str()).map(|(number, _)| number))
}

/// First line that looks like a hymn title, cleaned.
pub fn detect_title(lines: &[NormalizedLine], heuristics: &Heuristics) -> Option<String> {
    lines
        .iter()
        .map(|line| line.as_str().trim())
        .filter(|line| is_title_candidate(line, heuristics))
        .map(clean_title)
        .find(|title| title.chars().count() > heuristics.title_clean_min_len)
}

fn is_title_candidate(line: &str, heuristics: &Heuristics) -> bool {
    line.chars().count() > heuristics.title_min_len
        && heuristics.verse_marker(line).is_none()
        && !heuristics.is_title_noise(line)
        && (RE_CAPITAL_TRANSITION.is_match(line)
            || heuristics.title_vocabulary.iter().any(|term| line.contains(term.as_str())))
}

/// Keep letters, spaces, commas, hyphens and apostrophes.
fn clean_title(line: &str) -> String {
    let kept: String = line
        .chars()
        .filter(|&c| c.is_alphabetic() || c.is_whitespace() || matches!(c, ',' | '-' | '\''))
        .collect();
    collapse_whitespace(&kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::normalize::normalize;

    fn run(raw: &str) -> Detection {
        let h = Heuristics::default();
        detect(&normalize(raw, &h), &h)
    }

    #[test]
    fn finds_title_and_leading_verse() {
        let d = run("Amazing Grace\n1. Amazing grace how sweet\nthe sound");
        assert_eq!(d.title.as_deref(), Some("Amazing Grace"));
        assert_eq!(d.leading_verse, Some(1));
    }

    #[test]
    fn leading_verse_is_first_marker() {
        let d = run("header text here\n3. third verse\n1. first verse");
        assert_eq!(d.leading_verse, Some(3));
    }

    #[test]
    fn no_marker_means_no_number() {
        assert_eq!(run("Rock of Ages\ncleft for me").leading_verse, None);
    }

    #[test]
    fn vocabulary_term_qualifies_lowercase_line() {
        let d = run("sing praise to our Lord\nthe end");
        assert_eq!(d.title.as_deref(), Some("sing praise to our Lord"));
    }

    #[test]
    fn title_is_stripped_of_symbols() {
        let d = run("## Come, Thou Almighty King! 351\n1. Come thou");
        assert_eq!(d.title.as_deref(), Some("Come, Thou Almighty King"));
    }

    #[test]
    fn verse_lines_are_not_titles() {
        assert_eq!(run("1. Jesus, Lover of My Soul").title, None);
    }

    #[test]
    fn lowercase_lines_without_vocabulary_are_not_titles() {
        assert_eq!(run("all people that on earth\ndo dwell here").title, None);
    }

    #[test]
    fn short_cleaned_title_falls_through_to_next_candidate() {
        // Qualifies through "My" but cleans down to two characters.
        let d = run("My 1234567\nHoly Spirit Descend");
        assert_eq!(d.title.as_deref(), Some("Holy Spirit Descend"));
    }
}
