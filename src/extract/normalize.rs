//! OCR text normalization.
//!
//! Turns a raw OCR blob into trimmed, whitespace-collapsed lines and drops the
//! fragments left behind by musical notation.

use std::fmt;

use super::Heuristics;

/// A single cleaned OCR line, in original page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine(String);

impl NormalizedLine {
    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NormalizedLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize raw OCR text into lines.
///
/// Never reorders or merges lines, so the output is never longer than the
/// input. An empty result means the page had no extractable content.
pub fn normalize(raw: &str, heuristics: &Heuristics) -> Vec<NormalizedLine> {
    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !heuristics.is_short(line) && !heuristics.is_noise(line))
        .map(NormalizedLine)
        .collect()
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &str) -> Vec<String> {
        normalize(raw, &Heuristics::default())
            .into_iter()
            .map(|l| l.as_str().to_string())
            .collect()
    }

    #[test]
    fn collapses_whitespace_and_keeps_order() {
        assert_eq!(
            lines("  Amazing   Grace \n1.  Amazing\tgrace how sweet\n"),
            vec!["Amazing Grace", "1. Amazing grace how sweet"]
        );
    }

    #[test]
    fn drops_short_and_noise_lines() {
        let raw = "ab\n  \nx\nf-f\nabc\nThe sound\n|| ==\n";
        assert_eq!(lines(raw), vec!["The sound", "|| =="]);
    }

    #[test]
    fn noise_only_page_is_empty() {
        assert!(lines("a\nbb\n.\n--\n\n").is_empty());
        assert!(lines("").is_empty());
    }

    #[test]
    fn never_adds_lines() {
        let samples = [
            "",
            "one line only",
            "a\nb\nc",
            "1. Praise God\r\nfrom whom all\r\n\r\nblessings flow",
            "  \n\n\n   ",
            "x y z\nHoly, Holy, Holy\n2. Lord God Almighty",
        ];
        for raw in samples {
            assert!(normalize(raw, &Heuristics::default()).len() <= raw.lines().count());
        }
    }
}
