//! Verse segmentation.
//!
//! Walks normalized lines with a single piece of state: the number of the
//! verse currently open and the fragments collected for it. Markers are
//! expected in increasing order. A repeated or out-of-order marker closes the
//! open verse and starts a new one, so the output follows page order.

use super::normalize::{collapse_whitespace, NormalizedLine};
use super::record::Verse;
use super::Heuristics;

/// Split normalized lines into verses keyed by their leading markers.
pub fn segment(lines: &[NormalizedLine], heuristics: &Heuristics) -> Vec<Verse> {
    let mut verses = Vec::new();
    let mut current: Option<u32> = None;
    let mut fragments: Vec<&str> = Vec::new();

    for line in lines {
        let line = line.as_str().trim();
        if line.is_empty() {
            continue;
        }

        if let Some((number, rest)) = heuristics.verse_marker(line) {
            if let Some(open) = current {
                close_verse(open, &fragments, heuristics, &mut verses);
            }
            current = Some(number);
            fragments.clear();
            if !rest.is_empty() {
                fragments.push(rest);
            }
        } else if current.is_some() && is_verse_text(line, heuristics) {
            fragments.push(line);
        }
    }

    if let Some(open) = current {
        close_verse(open, &fragments, heuristics, &mut verses);
    }

    verses
}

fn is_verse_text(line: &str, heuristics: &Heuristics) -> bool {
    !heuristics.is_short(line)
        && !heuristics.is_noise(line)
        && line.chars().any(char::is_alphabetic)
}

fn close_verse(number: u32, fragments: &[&str], heuristics: &Heuristics, verses: &mut Vec<Verse>) {
    if fragments.is_empty() {
        return;
    }
    let text = clean_verse_text(&fragments.join(" "), heuristics);
    if !text.is_empty() {
        verses.push(Verse { number, text });
    }
}

/// Strip OCR artifacts from verse text.
///
/// Characters outside letters and ordinary punctuation become spaces, and
/// one-character tokens are dropped unless they are whitelisted words
/// (`a`, `I`, `O` by default).
pub fn clean_verse_text(text: &str, heuristics: &Heuristics) -> String {
    let kept: String = text
        .chars()
        .map(|c| if is_verse_char(c) { c } else { ' ' })
        .collect();

    collapse_whitespace(&kept)
        .split(' ')
        .filter(|word| word.chars().count() > 1 || heuristics.is_single_letter_word(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_verse_char(c: char) -> bool {
    c.is_alphabetic()
        || c.is_whitespace()
        || matches!(c, ',' | '-' | '.' | ';' | ':' | '\'' | '"' | '(' | ')')
}
